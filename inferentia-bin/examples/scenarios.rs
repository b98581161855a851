//! Walks through the knowledge base's main failure and success modes end to
//! end: retrieval, negation as failure, modus ponens, forward chaining, a
//! transaction rollback, and a handler panic that must not poison later
//! queries.
//!
//! Run with: cargo run --example scenarios

use inferentia_common::init_tracing;
use inferentia_engine::prelude::*;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    retrieval_and_negation().await?;
    modus_ponens_chain().await?;
    forward_chaining_listener().await?;
    transaction_rollback().await?;
    handler_panic_does_not_poison_later_queries().await?;

    println!("\nall scenarios completed");
    Ok(())
}

async fn retrieval_and_negation() -> anyhow::Result<()> {
    println!("\n== retrieval and negation as failure ==");
    let kb = KnowledgeBase::in_memory(Language::new());
    let raining = constant("raining");
    kb.add_formula(raining.clone()).await;

    let mut proofs = kb.async_prove(raining.clone(), Substitution::empty());
    use futures::StreamExt;
    assert!(proofs.next().await.is_some(), "a stored fact must be retrievable");

    let not_snowing = not(constant("snowing"));
    let mut proofs = kb.async_prove(not_snowing, Substitution::empty());
    assert!(proofs.next().await.is_some(), "an absent fact's negation must succeed");

    let not_raining = not(raining);
    let mut proofs = kb.async_prove(not_raining, Substitution::empty());
    assert!(proofs.next().await.is_none(), "negation must fail once the inner goal is provable");

    println!("ok");
    Ok(())
}

async fn modus_ponens_chain() -> anyhow::Result<()> {
    println!("\n== restricted modus ponens ==");
    let kb = KnowledgeBase::in_memory(Language::new());
    let raining = constant("raining");
    let wet = constant("wet");
    kb.add_formulas([raining.clone(), implies(raining, wet.clone())]).await;

    let proofs: Vec<_> = kb.prove(wet, Substitution::empty())?.collect();
    println!("{}", proofs[0].explain());
    Ok(())
}

async fn forward_chaining_listener() -> anyhow::Result<()> {
    println!("\n== forward chaining ==");
    let kb = KnowledgeBase::in_memory(Language::new());
    let cat = constant("cat");
    let mammal = constant("mammal");
    kb.add_formula(cat.clone()).await;

    kb.add_listener(Listener::new(
        "cat_is_mammal",
        cat.clone(),
        Safety::Safe,
        ArgumentMode::Raw,
        move |_arg: Term, _ctx: Context| {
            let mammal = mammal.clone();
            async move { Ok(vec![HandlerItem::Conclusion(mammal)]) }
        },
    ));

    let derived = kb.ponder(cat, Ponder::Known).await?;
    for proof in &derived {
        println!("{}", proof.explain());
    }
    Ok(())
}

async fn transaction_rollback() -> anyhow::Result<()> {
    println!("\n== transaction rollback on drop ==");
    let kb = KnowledgeBase::in_memory(Language::new());
    {
        let tx = kb.transaction().await?;
        info!("opened a transaction that will be dropped without committing");
        drop(tx);
    }
    println!("ok (in-memory backend logs a rollback warning on uncommitted drop)");
    Ok(())
}

async fn handler_panic_does_not_poison_later_queries() -> anyhow::Result<()> {
    println!("\n== a panicking listener must fail its own query, not the next one ==");
    let kb = KnowledgeBase::in_memory(Language::new());
    let trigger = constant("trigger");
    kb.add_formula(trigger.clone()).await;

    kb.add_listener(Listener::new(
        "buggy_handler",
        trigger.clone(),
        Safety::Safe,
        ArgumentMode::Raw,
        |_arg: Term, _ctx: Context| async { panic!("simulated bug in a listener handler") },
    ));

    match kb.ponder(trigger.clone(), Ponder::Known).await {
        Err(EngineError::HandlerPanic { listener, .. }) => {
            warn!(%listener, "listener panicked as expected");
        }
        other => anyhow::bail!("expected a HandlerPanic, got {other:?}"),
    }

    let harmless = constant("harmless");
    kb.add_formula(harmless.clone()).await;
    let proofs: Vec<_> = kb.prove(harmless, Substitution::empty())?.collect();
    assert_eq!(proofs.len(), 1, "the scheduler must still work after a handler panic");
    println!("ok");
    Ok(())
}
