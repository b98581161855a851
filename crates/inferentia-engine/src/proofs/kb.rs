//! The knowledge base: the facade gluing the term model, provers, listeners,
//! storage and the scheduler together.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use parking_lot::RwLock;

use inferentia_common::Metadata;
use inferentia_config::EngineConfig;
use inferentia_storage::{InMemoryBackend, StorageBackend, Transaction};

use crate::error::{EngineError, Result};
use crate::logic::{decode_term, encode_key, encode_term, make_key, Language, Substitution, Term, VecAbstruseIndex};
use crate::proofs::builtin_provers::{KnowledgeRetrieverProver, NegationProver, RestrictedModusPonens};
use crate::proofs::context::Context;
use crate::proofs::listener::{HandlerItem, Listener};
use crate::proofs::proof::{InferenceRule, Proof};
use crate::proofs::prover::{ProofStream, Prover};
use crate::proofs::scheduler::{multiplex, Scheduler};

/// Which provers `KnowledgeBase::ponder` consults before forward-chaining
/// listeners against the result.
pub enum Ponder {
    /// Only the built-in knowledge retriever — no backward chaining.
    Known,
    /// Every registered prover.
    Prove,
    /// Reason inside a rolled-back transaction without committing anything.
    /// Not implemented.
    Hypothetically,
}

struct KbState {
    language: Language,
    index: VecAbstruseIndex,
    storage: Arc<dyn StorageBackend>,
    sequence: AtomicU64,
    index_key_depth: usize,
    multiplex_buffer_size: usize,
    provers: RwLock<Vec<Arc<dyn Prover>>>,
    listeners: RwLock<Vec<Listener>>,
    scheduler: Scheduler,
}

/// A knowledge base: a language, a set of stored formulas, the provers and
/// listeners registered against it, and the scheduler driving proof search.
///
/// Cheap to clone — internally an `Arc`, so every [`Context`] handed to a
/// prover or listener can hold its own handle back to the same state.
#[derive(Clone)]
pub struct KnowledgeBase(Arc<KbState>);

impl KnowledgeBase {
    pub fn new(language: Language, storage: Arc<dyn StorageBackend>, config: &EngineConfig) -> Self {
        let provers: Vec<Arc<dyn Prover>> = vec![
            Arc::new(KnowledgeRetrieverProver),
            Arc::new(NegationProver),
            Arc::new(RestrictedModusPonens),
        ];
        Self(Arc::new(KbState {
            language,
            index: VecAbstruseIndex::new(config.index_key_depth),
            storage,
            sequence: AtomicU64::new(0),
            index_key_depth: config.index_key_depth,
            multiplex_buffer_size: config.multiplex_buffer_size,
            provers: RwLock::new(provers),
            listeners: RwLock::new(Vec::new()),
            scheduler: Scheduler::spawn(),
        }))
    }

    /// A knowledge base backed by an in-memory store, with default
    /// configuration. Handy for tests and the CLI demo.
    pub fn in_memory(language: Language) -> Self {
        Self::new(language, Arc::new(InMemoryBackend::new()), &EngineConfig::default())
    }

    pub fn language(&self) -> Language {
        self.0.language.clone()
    }

    pub fn add_prover(&self, prover: impl Prover + 'static) {
        self.0.provers.write().push(Arc::new(prover));
    }

    pub fn add_listener(&self, listener: Listener) {
        self.0.listeners.write().push(listener);
    }

    /// Adds `term` to the in-memory abstruse index, the fast path every
    /// retrieval goes through, and appends it to the durable storage backend
    /// for persistence and transactional rollback. The two are kept in sync
    /// here rather than having one rebuild from the other, since the index
    /// has no notion of text encoding and the storage backend has no notion
    /// of `Term`.
    pub async fn add_formula(&self, term: Term) {
        let sequence = self.0.sequence.fetch_add(1, Ordering::Relaxed);
        self.0.index.add(term.clone(), Metadata::new(sequence));

        let key_text = encode_key(&make_key(&term, self.0.index_key_depth));
        let term_text = encode_term(&term);
        if let Err(err) = self.0.storage.add(term_text, key_text).await {
            tracing::error!(%err, "failed to persist formula to storage");
        }
    }

    pub async fn add_formulas(&self, terms: impl IntoIterator<Item = Term>) {
        for term in terms {
            self.add_formula(term).await;
        }
    }

    /// Every stored formula whose abstruse-index key is compatible with
    /// `goal`'s — a superset of what actually unifies with `goal`. Served
    /// from the in-memory index, not storage, so this never touches I/O.
    pub async fn search_unifiable(&self, goal: &Term) -> Vec<Term> {
        self.0.index.retrieve(goal).into_iter().map(|(term, _)| term).collect()
    }

    /// Rebuilds the in-memory index from the durable storage backend —
    /// needed after restarting against a [`StorageBackend`] that outlives
    /// the process, since the index itself is never persisted.
    pub async fn rehydrate(&self) -> Result<()> {
        let key_text = encode_key(&crate::logic::Key::Wildcard);
        let records = self.0.storage.search_unifiable(&key_text).await?;
        for record in records {
            let term = decode_term(&record.term_text, &self.0.language);
            let sequence = self.0.sequence.fetch_add(1, Ordering::Relaxed);
            self.0.index.add(term, Metadata::new(sequence));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.index.len()
    }

    pub fn supports_transactions(&self) -> bool {
        self.0.storage.supports_transactions()
    }

    pub async fn transaction(&self) -> Result<Transaction> {
        Ok(Transaction::begin(self.0.storage.clone()).await?)
    }

    /// Proves `goal` by fanning it out across every registered prover and
    /// multiplexing their answers into one stream. Safe to call from inside
    /// a prover or listener handler — unlike [`KnowledgeBase::prove`], this
    /// never touches the scheduler's blocking bridge.
    #[tracing::instrument(skip(self, previous), fields(goal = %goal))]
    pub fn async_prove(&self, goal: Term, previous: Substitution) -> ProofStream {
        let ctx = Context::new(self.clone());
        let provers = self.0.provers.read().clone();
        let streams: Vec<ProofStream> = provers
            .iter()
            .map(|prover| prover.prove(goal.clone(), previous.clone(), ctx.clone()))
            .collect();
        multiplex(streams, self.0.multiplex_buffer_size)
    }

    /// Synchronous entry point, for callers outside any async runtime.
    /// Returns [`EngineError::ReentrantProve`] if called from inside a task
    /// already running on the scheduler (a prover or listener handler
    /// should call `async_prove` instead).
    #[tracing::instrument(skip(self, previous), fields(goal = %goal))]
    pub fn prove(&self, goal: Term, previous: Substitution) -> Result<impl Iterator<Item = Arc<Proof>>> {
        let stream = self.async_prove(goal, previous);
        self.0.scheduler.run_to_iterator(stream, self.0.multiplex_buffer_size)
    }

    /// Proves `goal`, then forward-chains every registered listener against
    /// the resulting proofs — and against whatever those listeners derive in
    /// turn — until each seed's chain of newly triggered proofs runs dry.
    ///
    /// The seed proofs found by `initial_stream` are never themselves part of
    /// the result: they are only the triggers forward chaining starts from.
    /// Only proofs a listener actually derived are returned, in the order
    /// each seed's chain produced them — one seed's whole chain completes
    /// before the next seed's chain begins, so siblings from different seeds
    /// never interleave.
    pub async fn ponder(&self, goal: Term, mode: Ponder) -> Result<Vec<Arc<Proof>>> {
        if matches!(mode, Ponder::Hypothetically) {
            return Err(EngineError::NotImplemented);
        }

        let mut seeds = Vec::new();
        let mut initial = self.initial_stream(goal, &mode);
        while let Some(proof) = initial.next().await {
            seeds.push(proof);
        }

        let mut derived = Vec::new();
        for seed in seeds {
            let mut queue: VecDeque<Arc<Proof>> = VecDeque::new();
            queue.push_back(seed);
            while let Some(proof) = queue.pop_front() {
                self.fire_listeners(&proof, &mut queue, &mut derived).await?;
            }
        }
        Ok(derived)
    }

    fn initial_stream(&self, goal: Term, mode: &Ponder) -> ProofStream {
        match mode {
            Ponder::Known => {
                let ctx = Context::new(self.clone());
                KnowledgeRetrieverProver.prove(goal, Substitution::empty(), ctx)
            }
            _ => self.async_prove(goal, Substitution::empty()),
        }
    }

    async fn fire_listeners(
        &self,
        proof: &Arc<Proof>,
        queue: &mut VecDeque<Arc<Proof>>,
        derived: &mut Vec<Arc<Proof>>,
    ) -> Result<()> {
        let listeners = self.0.listeners.read().clone();
        for listener in listeners {
            let Some(argument) = listener.matches(&proof.conclusion)? else {
                continue;
            };
            let ctx = Context::new(self.clone());
            let items = match AssertUnwindSafe(listener.handler.call(argument, ctx)).catch_unwind().await {
                Ok(result) => result?,
                Err(panic) => {
                    return Err(EngineError::HandlerPanic {
                        listener: listener.name.clone(),
                        message: panic_message(&panic),
                    })
                }
            };
            for item in items {
                let new_proof = build_pondering_proof(&listener.name, proof, item);
                self.add_formula(new_proof.conclusion.clone()).await;
                queue.push_back(new_proof.clone());
                derived.push(new_proof);
            }
        }
        Ok(())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "listener handler panicked with a non-string payload".to_string()
    }
}

fn build_pondering_proof(listener_name: &str, trigger: &Arc<Proof>, item: HandlerItem) -> Arc<Proof> {
    let rule = InferenceRule::Pondering {
        listener: listener_name.to_string(),
        triggering_formula: trigger.conclusion.clone(),
    };
    match item {
        HandlerItem::Conclusion(term) => Proof::new(rule, term, trigger.substitution.clone(), vec![trigger.clone()]),
        HandlerItem::WithSubstitution(term, subst) => Proof::new(rule, term, subst, vec![trigger.clone()]),
        HandlerItem::WithPremises(term, mut extra_premises) => {
            let mut premises = vec![trigger.clone()];
            premises.append(&mut extra_premises);
            Proof::new(rule, term, trigger.substitution.clone(), premises)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::term::Language;
    use crate::proofs::listener::{ArgumentMode, Safety};

    #[tokio::test]
    async fn ponder_forward_chains_through_a_listener() {
        let kb = KnowledgeBase::in_memory(Language::new());
        let lang = kb.language();
        let is_cat = lang.constant("is_cat");
        let is_mammal = lang.constant("is_mammal");
        kb.add_formula(is_cat.clone()).await;

        kb.add_listener(Listener::new(
            "cat_implies_mammal",
            is_cat.clone(),
            Safety::Safe,
            ArgumentMode::Raw,
            move |_arg: Term, _ctx: Context| {
                let is_mammal = is_mammal.clone();
                async move { Ok(vec![HandlerItem::Conclusion(is_mammal)]) }
            },
        ));

        let proofs = kb.ponder(is_cat, Ponder::Known).await.unwrap();
        assert!(proofs.iter().any(|p| matches!(p.inference_rule, InferenceRule::Pondering { .. })));
    }

    #[tokio::test]
    async fn ponder_known_excludes_the_seed_and_keeps_chain_order() {
        let kb = KnowledgeBase::in_memory(Language::new());
        let lang = kb.language();
        let a = lang.constant("a_foo");
        let b = lang.constant("b_foo");
        let c = lang.constant("c_foo");
        let d = lang.constant("d_foo");
        kb.add_formula(a.clone()).await;

        let next = b.clone();
        kb.add_listener(Listener::new("a_to_b", a.clone(), Safety::Safe, ArgumentMode::Raw, move |_arg: Term, _ctx: Context| {
            let next = next.clone();
            async move { Ok(vec![HandlerItem::Conclusion(next)]) }
        }));
        let next = c.clone();
        kb.add_listener(Listener::new("b_to_c", b.clone(), Safety::Safe, ArgumentMode::Raw, move |_arg: Term, _ctx: Context| {
            let next = next.clone();
            async move { Ok(vec![HandlerItem::Conclusion(next)]) }
        }));
        let next = d.clone();
        kb.add_listener(Listener::new("c_to_d", c.clone(), Safety::Safe, ArgumentMode::Raw, move |_arg: Term, _ctx: Context| {
            let next = next.clone();
            async move { Ok(vec![HandlerItem::Conclusion(next)]) }
        }));

        let derived = kb.ponder(a, Ponder::Known).await.unwrap();
        let conclusions: Vec<Term> = derived.iter().map(|p| p.conclusion.clone()).collect();
        assert_eq!(conclusions, vec![b, c, d], "the seed `a_foo` must not appear in the result");
    }

    #[tokio::test]
    async fn ponder_known_with_a_side_effect_only_listener_yields_no_proofs() {
        let kb = KnowledgeBase::in_memory(Language::new());
        let lang = kb.language();
        let is_cat_dylan = lang.constant("is_cat_dylan");
        kb.add_formula(is_cat_dylan.clone()).await;

        kb.add_listener(Listener::new(
            "log_only",
            is_cat_dylan.clone(),
            Safety::Safe,
            ArgumentMode::Raw,
            |_arg: Term, _ctx: Context| async { Ok(Vec::new()) },
        ));

        let derived = kb.ponder(is_cat_dylan, Ponder::Known).await.unwrap();
        assert!(derived.is_empty(), "a listener with no conclusions must not surface the seed proof");
    }

    #[tokio::test]
    async fn hypothetically_is_not_implemented() {
        let kb = KnowledgeBase::in_memory(Language::new());
        let goal = kb.language().constant("anything");
        let result = kb.ponder(goal, Ponder::Hypothetically).await;
        assert!(matches!(result, Err(EngineError::NotImplemented)));
    }

    #[tokio::test]
    async fn transactions_roll_back_on_drop() {
        let kb = KnowledgeBase::in_memory(Language::new());
        {
            let tx = kb.transaction().await.unwrap();
            drop(tx);
        }
        assert!(!kb.supports_transactions(), "in-memory backend reports no real transaction support");
    }

    #[tokio::test]
    async fn rehydrate_rebuilds_the_index_from_storage() {
        let lang = Language::new();
        let cat = lang.constant("cat");
        let kb = KnowledgeBase::in_memory(lang.clone());
        kb.add_formula(cat.clone()).await;

        let fresh = KnowledgeBase::new(lang, kb_storage(&kb), &EngineConfig::default());
        assert_eq!(fresh.len(), 0, "a fresh index starts empty even when storage already has data");
        fresh.rehydrate().await.unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh.search_unifiable(&cat).await, vec![cat]);
    }

    fn kb_storage(kb: &KnowledgeBase) -> Arc<dyn StorageBackend> {
        kb.0.storage.clone()
    }

    #[test]
    fn prove_from_outside_the_scheduler_succeeds() {
        let kb = KnowledgeBase::in_memory(Language::new());
        let cat = kb.language().constant("cat");
        tokio_test::block_on(kb.add_formula(cat.clone()));
        let proofs: Vec<_> = kb.prove(cat, Substitution::empty()).unwrap().collect();
        assert_eq!(proofs.len(), 1);
    }
}
