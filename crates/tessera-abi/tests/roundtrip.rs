//! End-to-end schema compilation and codec round-trips over a realistic
//! token-contract schema.

use proptest::prelude::*;

use tessera_abi::{Abi, AbiNamespace, AbiValue, BuildError, ValidationError};

fn token_abi() -> Abi {
    Abi::from_json(
        r#"{
            "version": "tessera::abi/1.0",
            "types": [
                {"new_type_name": "account_name", "type": "name"}
            ],
            "structs": [
                {"name": "transfer", "fields": [
                    {"name": "from", "type": "account_name"},
                    {"name": "to", "type": "account_name"},
                    {"name": "quantity", "type": "asset"},
                    {"name": "memo", "type": "string"},
                    {"name": "fee", "type": "asset$"}
                ]},
                {"name": "account", "fields": [
                    {"name": "balance", "type": "asset"}
                ]},
                {"name": "tagged_transfer", "base": "transfer_header", "fields": [
                    {"name": "tags", "type": "string[]"}
                ]},
                {"name": "transfer_header", "fields": [
                    {"name": "seq", "type": "uint64"},
                    {"name": "at", "type": "time_point_sec"}
                ]}
            ],
            "variants": [
                {"name": "payee", "types": ["account_name", "account"]}
            ],
            "actions": [
                {"name": "transfer", "type": "transfer"}
            ],
            "tables": [
                {"name": "accounts", "type": "account", "index_type": "i64",
                 "key_names": ["balance"], "key_types": ["asset"]}
            ]
        }"#,
    )
    .expect("token schema parses")
}

fn token_ns() -> AbiNamespace {
    AbiNamespace::build(token_abi()).expect("token schema compiles")
}

#[test]
fn transfer_round_trips_through_wire_and_structural_forms() {
    let ns = token_ns();
    let transfer = ns.require("transfer").unwrap();

    let interchange = AbiValue::map(vec![
        ("from", AbiValue::from("alice")),
        ("to", AbiValue::from("bob")),
        ("quantity", AbiValue::from("1.0000 EOS")),
        ("memo", AbiValue::from("rent")),
        ("fee", AbiValue::Null),
    ]);
    let canonical = transfer.from_structural(&interchange).unwrap();
    let bytes = transfer.encode(&canonical).unwrap();
    assert_eq!(transfer.decode(&bytes).unwrap(), canonical);
    assert_eq!(transfer.to_structural(&canonical).unwrap(), interchange);
}

#[test]
fn extension_field_encodes_to_nothing_when_absent() {
    let ns = AbiNamespace::build(
        Abi::from_json(
            r#"{"structs": [{"name": "foo", "fields": [
                {"name": "x", "type": "uint32"},
                {"name": "y", "type": "string$"}
            ]}]}"#,
        )
        .unwrap(),
    )
    .unwrap();
    let foo = ns.require("foo").unwrap();

    let absent = AbiValue::map(vec![("x", AbiValue::from(1u64))]);
    assert_eq!(foo.encode(&absent).unwrap(), vec![1, 0, 0, 0]);

    let present = AbiValue::map(vec![
        ("x", AbiValue::from(1u64)),
        ("y", AbiValue::from("hi")),
    ]);
    assert_eq!(foo.encode(&present).unwrap(), vec![1, 0, 0, 0, 2, b'h', b'i']);
}

#[test]
fn variant_arm_selection_follows_declared_order() {
    let ns = AbiNamespace::build(
        Abi::from_json(r#"{"variants": [{"name": "v", "types": ["uint8", "string"]}]}"#).unwrap(),
    )
    .unwrap();
    let v = ns.require("v").unwrap();

    // second arm: varint(1) + varint(2) + "ab"
    let bytes = v.encode(&AbiValue::from("ab")).unwrap();
    assert_eq!(bytes, vec![1, 2, b'a', b'b']);

    // tag 0 selects the first declared arm
    let decoded = v.decode(&[0x00, 0x05]).unwrap();
    assert_eq!(
        decoded,
        AbiValue::List(vec![AbiValue::from("uint8"), AbiValue::UInt(5)])
    );
}

#[test]
fn alias_cycle_names_the_full_path() {
    let err = AbiNamespace::build(
        Abi::from_json(
            r#"{"types": [
                {"new_type_name": "a", "type": "b"},
                {"new_type_name": "b", "type": "a"}
            ]}"#,
        )
        .unwrap(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "cyclic alias: a -> b -> a");
}

#[test]
fn base_with_extension_field_rejected_even_for_clean_derived() {
    let err = AbiNamespace::build(
        Abi::from_json(
            r#"{"structs": [
                {"name": "base", "fields": [{"name": "f", "type": "string$"}]},
                {"name": "derived", "base": "base", "fields": [{"name": "x", "type": "uint8"}]}
            ]}"#,
        )
        .unwrap(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        BuildError::Validation(ValidationError::BaseExtensionField { .. })
    ));
}

#[test]
fn base_fields_decode_before_own_fields() {
    let ns = token_ns();
    let tagged = ns.require("tagged_transfer").unwrap();

    let value = AbiValue::map(vec![
        ("seq", AbiValue::from(9u64)),
        ("at", AbiValue::Int(1_682_944_200)),
        (
            "tags",
            AbiValue::List(vec![AbiValue::from("rent"), AbiValue::from("may")]),
        ),
    ]);
    let bytes = tagged.encode(&value).unwrap();
    // u64 seq + u32 seconds + varint count + two length-prefixed strings
    assert_eq!(bytes.len(), 8 + 4 + 1 + 5 + 4);
    assert_eq!(tagged.decode(&bytes).unwrap(), value);
}

#[test]
fn fingerprint_tracks_declaration_substance() {
    let base = token_abi().fingerprint();
    assert_eq!(token_abi().fingerprint(), base);

    let mut renamed_field = token_abi();
    renamed_field.structs[0].fields[3].name = "note".into();
    assert_ne!(renamed_field.fingerprint(), base);

    let mut retyped_arm = token_abi();
    retyped_arm.variants[0].types[0] = "name".into();
    assert_ne!(retyped_arm.fingerprint(), base);

    // action and table bindings are outside the digest
    let mut no_bindings = token_abi();
    no_bindings.actions.clear();
    no_bindings.tables.clear();
    assert_eq!(no_bindings.fingerprint(), base);
}

#[test]
fn action_binding_resolves_payload_type() {
    let ns = token_ns();
    let payload = ns.action_type("transfer").unwrap();
    assert_eq!(payload.name(), "transfer");
    assert_eq!(ns.table_type("accounts").unwrap().name(), "account");
}

#[test]
fn namespace_is_shareable_across_threads() {
    let ns = token_ns();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let ns = ns.clone();
            std::thread::spawn(move || {
                let account = ns.require("account").unwrap();
                let value = AbiValue::map(vec![(
                    "balance",
                    AbiValue::from(format!("{i}.0000 EOS")),
                )]);
                let canonical = account.from_structural(&value).unwrap();
                let bytes = account.encode(&canonical).unwrap();
                assert_eq!(account.decode(&bytes).unwrap(), canonical);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

// ---------------------------------------------------------------------------
// randomized round-trips
// ---------------------------------------------------------------------------

fn arb_transfer() -> impl Strategy<Value = AbiValue> {
    let name = proptest::sample::select(vec!["alice", "bob", "eosio.token", "a.b.c"]);
    let amount = 0i64..1_000_000;
    let memo = "[a-z ]{0,32}";
    let fee = proptest::option::of(0i64..1_000);
    (name.clone(), name, amount, memo, fee).prop_map(|(from, to, amount, memo, fee)| {
        AbiValue::map(vec![
            ("from", AbiValue::from(from)),
            ("to", AbiValue::from(to)),
            ("quantity", AbiValue::from(format!("{amount}.0000 EOS"))),
            ("memo", AbiValue::from(memo)),
            (
                "fee",
                fee.map_or(AbiValue::Null, |f| AbiValue::from(format!("{f}.0000 EOS"))),
            ),
        ])
    })
}

proptest! {
    #[test]
    fn prop_transfer_wire_round_trip(interchange in arb_transfer()) {
        let ns = token_ns();
        let transfer = ns.require("transfer").unwrap();
        let canonical = transfer.from_structural(&interchange).unwrap();
        let bytes = transfer.encode(&canonical).unwrap();
        prop_assert_eq!(transfer.decode(&bytes).unwrap(), canonical.clone());
        prop_assert_eq!(
            transfer.from_structural(&transfer.to_structural(&canonical).unwrap()).unwrap(),
            canonical
        );
    }

    #[test]
    fn prop_decode_never_panics_on_garbage(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let ns = token_ns();
        let transfer = ns.require("transfer").unwrap();
        let _ = transfer.decode(&bytes);
        let payee = ns.require("payee").unwrap();
        let _ = payee.decode(&bytes);
    }
}
