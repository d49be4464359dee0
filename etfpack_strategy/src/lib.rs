use bytes::Bytes;
use etfpack::{bignum::BigNum, vecmap::VecMap, Export, NodeRef, ProcessId, Value};
use proptest::prelude::*;

const RESERVED: [&str; 4] = ["nil", "null", "true", "false"];

/// arbitrary atom text that survives decoding as an atom
pub fn arb_atom() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-zA-Z0-9_@]{0,20}",
        "\\PC{0,40}",
    ]
    .prop_filter("reserved atoms decode to other values", |s| {
        !RESERVED.contains(&s.as_str())
    })
}

/// arbitrary Bytes for use with proptest
pub fn arb_bs() -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..64).prop_map(Bytes::from)
}

/// arbitrary bignum that doesn't fit in an `i64`, but does fit in eight bytes
pub fn arb_bignum() -> impl Strategy<Value = BigNum> {
    (any::<bool>(), (1u64 << 63)..=u64::max_value())
        .prop_map(|(negative, magnitude)| BigNum::from_sign_magnitude(negative, magnitude))
}

/// arbitrary integer that decodes back to an integer
pub fn arb_int() -> impl Strategy<Value = i64> {
    prop_oneof![
        0i64..=255,
        any::<i32>().prop_map(i64::from),
        (i64::min_value() + 1)..=i64::max_value(),
    ]
}

fn arb_node() -> impl Strategy<Value = Box<Value>> { arb_atom().prop_map(|a| Box::new(Value::Atom(a))) }

/// arbitrary reference, pid, or export
pub fn arb_record() -> impl Strategy<Value = Value> {
    prop_oneof![
        (arb_node(), prop::collection::vec(any::<u32>(), 0..5), any::<u8>()).prop_map(
            |(node, ids, creation)| Value::NodeRef(NodeRef {
                node,
                ids,
                creation,
            })
        ),
        (arb_node(), any::<u32>(), any::<u32>(), any::<u8>()).prop_map(
            |(node, id, serial, creation)| Value::ProcessId(ProcessId {
                node,
                id,
                serial,
                creation,
            })
        ),
        (arb_atom(), arb_atom(), 0i64..=255).prop_map(|(module, function, arity)| {
            Value::from(Export {
                module:   Value::Atom(module),
                function: Value::Atom(function),
                arity:    Value::from(arity),
            })
        }),
    ]
}

/// arbitrary scalar value that survives a round trip
pub fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nil),
        Just(Value::null()),
        any::<bool>().prop_map(Value::Boolean),
        arb_int().prop_map(Value::Integer),
        any::<f64>().prop_map(Value::Float),
        arb_atom().prop_map(Value::Atom),
        arb_bs().prop_map(Value::Binary),
        any::<String>().prop_map(Value::from),
        arb_bignum().prop_map(Value::BigInt),
        arb_record(),
    ]
}

/// arbitrary Value for use with proptest
///
/// Every value this generates decodes back to itself.
pub fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(
        8,  // max depth
        64, // max nodes
        10, // max items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..10).prop_map(Value::Sequence),
                prop::collection::vec((inner.clone(), inner), 0..10)
                    .prop_map(|pairs| Value::Mapping(VecMap::from(pairs))),
            ]
        },
    )
}
