//! Demo CLI: populates an in-process knowledge base, backward-chains a goal
//! through it, then forward-chains a listener and prints what it derives.
//!
//! Run with: cargo run --bin inferentia

use inferentia_common::init_tracing;
use inferentia_engine::prelude::*;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = inferentia_config::load();

    let language = Language::new();
    let kb = KnowledgeBase::in_memory(language.clone());

    let raining = constant("raining");
    let wet = constant("wet");
    let slippery = constant("slippery");

    info!(data_dir = %config.data_dir, "seeding knowledge base");
    kb.add_formulas([raining.clone(), implies(raining.clone(), wet.clone())]).await;

    println!("proving `wet` by backward chaining through `raining -> wet`:\n");
    for proof in kb.prove(wet.clone(), Substitution::empty())? {
        println!("{}\n", proof.explain());
    }

    kb.add_listener(Listener::new(
        "wet_implies_slippery",
        wet.clone(),
        Safety::Safe,
        ArgumentMode::Raw,
        move |_argument: Term, ctx: Context| {
            let slippery = slippery.clone();
            async move {
                let _ = ctx;
                Ok(vec![HandlerItem::Conclusion(slippery)])
            }
        },
    ));

    println!("pondering `wet`, forward-chaining the registered listener:\n");
    let derived = kb.ponder(wet, Ponder::Prove).await?;
    for proof in &derived {
        println!("{}\n", proof.explain());
    }

    info!(formula_count = kb.len(), "done");
    Ok(())
}
