use bedrock_registrar::{
    normalize_name, ItemDefinition, Namespace, RegisterOptions, Registrar, RegistrarConfig,
    RuntimeId, TypeId,
};
use proptest::prelude::*;

fn display_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,24}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn allocation_is_gap_free_and_monotonic(
        item_floor in 0u32..100_000,
        block_floor in 0u32..100_000,
        pulls in proptest::collection::vec(any::<bool>(), 1..64),
    ) {
        let config = RegistrarConfig {
            first_unused_item_id: item_floor,
            first_unused_block_id: block_floor,
            ..RegistrarConfig::default()
        };
        let mut reg = Registrar::new(config);
        let (mut last_item, mut last_block) = (item_floor, block_floor);

        for pull_item in pulls {
            if pull_item {
                let id = reg.next_item_id().unwrap();
                prop_assert_eq!(id, TypeId(last_item + 1));
                last_item = id.0;
            } else {
                let id = reg.next_block_id().unwrap();
                prop_assert_eq!(id, TypeId(last_block + 1));
                last_block = id.0;
            }
        }
    }

    #[test]
    fn derived_namespace_is_deterministic(name in display_name()) {
        let a = Namespace::derive(&name);
        let b = Namespace::derive(&name);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.namespace(), "minecraft");
        prop_assert!(!a.path().contains(' '));
        prop_assert_eq!(a.path(), a.path().to_lowercase());
    }

    #[test]
    fn lookup_normalization_ignores_case_spacing_and_prefix(name in display_name()) {
        let plain = normalize_name(&name);
        prop_assert_eq!(&normalize_name(&name.to_uppercase()), &plain);
        prop_assert_eq!(&normalize_name(&format!("minecraft:{name}")), &plain);
        prop_assert_eq!(&normalize_name(&plain), &plain);
    }

    #[test]
    fn registered_item_resolves_by_derived_namespace(name in display_name(), rid in -5000i32..5000) {
        let mut reg = Registrar::new(RegistrarConfig::default());
        let id = reg.next_item_id().unwrap();
        reg.register_item(ItemDefinition::new(id, name.clone()), RuntimeId(rid), RegisterOptions::new())
            .unwrap();

        prop_assert_eq!(reg.item_runtime_id(&Namespace::derive(&name)), Some(RuntimeId(rid)));
        let saved = reg.serialize_item(reg.item_by_type_id(id).unwrap()).unwrap();
        prop_assert_eq!(reg.deserialize_item(&saved).unwrap().type_id, id);
    }
}
