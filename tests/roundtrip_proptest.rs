use beamterm::codec::types::{BigInt, Sign};
use beamterm::{decode, encode, Value};
use bytes::Bytes;
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<u8>().prop_map(Value::SmallInteger),
        any::<i32>().prop_map(Value::Integer),
        any::<i64>().prop_map(Value::from),
        (any::<bool>(), prop::collection::vec(any::<u8>(), 0..40)).prop_map(|(negative, magnitude)| {
            let sign = if negative { Sign::Negative } else { Sign::Positive };
            Value::BigInt(BigInt::new(sign, magnitude))
        }),
        any::<f64>().prop_map(Value::Float),
        "\\PC{0,40}".prop_map(|text| Value::atom(text).unwrap()),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(|data| Value::String(Bytes::from(data))),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(|data| Value::Binary(Bytes::from(data))),
        Just(Value::Nil),
    ]
}

fn term() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 96, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::tuple),
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::list),
            (prop::collection::vec(inner.clone(), 1..6), inner.clone())
                .prop_map(|(elements, tail)| Value::improper_list(elements, tail)),
            prop::collection::vec((inner.clone(), inner), 0..6).prop_map(Value::map),
        ]
    })
}

proptest! {
    #[test]
    fn prop_round_trip_keeps_meaning(value in term()) {
        let bytes = encode(&value).unwrap();
        let decoded = decode(&bytes).unwrap();
        prop_assert!(decoded.semantic_eq(&value), "{:?} decoded as {:?}", value, decoded);
    }

    #[test]
    fn prop_encoding_is_canonical(value in term()) {
        let bytes = encode(&value).unwrap();
        let again = encode(&decode(&bytes).unwrap()).unwrap();
        prop_assert_eq!(again, bytes);
    }

    #[test]
    fn prop_integers_use_minimal_tags(n in any::<i64>()) {
        let bytes = encode(&Value::from(n)).unwrap();
        let expected_tag = if (0..=255).contains(&n) {
            97
        } else if i32::try_from(n).is_ok() {
            98
        } else {
            110
        };
        prop_assert_eq!(bytes[1], expected_tag);
        prop_assert_eq!(decode(&bytes).unwrap().as_i64(), Some(n));
    }

    #[test]
    fn prop_arbitrary_input_never_panics(body in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut data = vec![131];
        data.extend_from_slice(&body);
        let _ = decode(&data);
    }
}
