//! Proptest generators for property-based testing.

use proptest::prelude::*;

use aidreg_core::{Aid, Keypair, Record};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a key set of `1..=max` keypairs.
pub fn key_set(max: usize) -> impl Strategy<Value = Vec<Keypair>> {
    prop::collection::vec(keypair(), 1..=max)
}

/// Generate a name, including quotes, escapes and non-ASCII text.
pub fn name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z][A-Za-z .'-]{0,31}",
        any::<String>(),
    ]
}

/// Parameters for generating a record.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub keypair: Keypair,
    pub name: String,
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (keypair(), name())
            .prop_map(|(keypair, name)| RecordParams { keypair, name })
            .boxed()
    }
}

/// Build the record described by `params`.
pub fn record_from_params(params: &RecordParams) -> Record {
    Record::new(Aid::basic(&params.keypair.public_key()), params.name.clone()).unwrap()
}
