/// Declares a test that builds a descriptor, checks its packed bytes, then
/// registers it and checks the round trip through the registry.
///
/// `build` receives the registry so it can look up basic identifiers.
#[macro_export]
macro_rules! test_case {
    (
        $name:ident,
        build: |$registry:ident| $build:expr,
        packed: [$($byte:expr),* $(,)?],
        display: $display:expr $(,)?
    ) => {
        #[test]
        fn $name() {
            let mut registry = upl::TypeRegistry::new();
            let stir: upl::Stir = {
                let $registry = &registry;
                $build
            };
            let packed = upl::st_code::pack(&stir);
            let expected: &[u8] = &[$($byte),*];
            pretty_assertions::assert_eq!(packed.as_bytes(), expected, "packed bytes");
            pretty_assertions::assert_eq!(
                upl::st_code::unpack(packed.as_bytes()),
                Ok(stir.clone())
            );

            let id = registry.try_create_type(&packed).unwrap();
            assert!(id.raw() > 16, "{} should be a new type", id);
            pretty_assertions::assert_eq!(registry.create_type(&packed), id);
            pretty_assertions::assert_eq!(registry.display(id).to_string(), $display);
            pretty_assertions::assert_eq!(registry.packed(id), Ok(packed));
            pretty_assertions::assert_eq!(registry.unpack(id).map(|v| v.to_stir()), Ok(stir));
        }
    };
}
