use super::{RegistryOptions, ScopedNames, TypeRegistry, Unpacked};
use crate::error::{DecodeError, StError};
use crate::st_code::{
    PackedSt, Stir, TypeId, make_array, make_function, make_int, make_map, make_package, make_tuple,
    make_variant, make_vector, pack,
};
use crate::test_utils::init_test_logging;
use alloc::collections::BTreeSet;
use pretty_assertions::assert_eq;
use upl_types::Tag;

fn id(raw: u32) -> TypeId {
    TypeId::new(raw)
}

fn raw(bytes: &[u8]) -> PackedSt {
    PackedSt::from_bytes(bytes).unwrap()
}

fn set(ids: &[TypeId]) -> BTreeSet<TypeId> {
    ids.iter().copied().collect()
}

#[test]
fn test_basic_types_are_preregistered() {
    let registry = TypeRegistry::new();
    assert_eq!(registry.len(), 16);
    assert_eq!(registry.stash_len(), 0);

    for (index, tag) in Tag::BASIC.into_iter().enumerate() {
        let plain = registry.by_tag(tag);
        let constant = registry.by_basic(tag, true);
        assert_eq!(plain, id(1 + 2 * index as u32));
        assert_eq!(constant, id(2 + 2 * index as u32));
        assert_eq!(registry.tag(plain), Some(tag));
        assert_eq!(registry.tag(constant), Some(tag));
        assert!(!registry.is_const(plain));
        assert!(registry.is_const(constant));
        assert_eq!(registry.lookup_type(&registry.packed(constant).unwrap()), constant);
    }
    assert_eq!(registry.lookup_type(&pack(&make_int(false))), id(9));
    assert_eq!(registry.by_tag(Tag::Int), id(9));
    assert_eq!(registry.by_tag(Tag::Array), TypeId::INVALID);
    assert_eq!(registry.by_basic(Tag::Function, true), TypeId::INVALID);
}

#[test]
fn test_by_tag_is_stable_across_registrations() {
    let mut registry = TypeRegistry::new();
    let before: Vec<_> = Tag::ALL.iter().map(|&t| registry.by_tag(t)).collect();
    let char_ = registry.by_tag(Tag::Char);
    for n in 0..40 {
        assert!(registry.register(&make_array(false, n, char_)).raw() > 16);
    }
    let after: Vec<_> = Tag::ALL.iter().map(|&t| registry.by_tag(t)).collect();
    assert_eq!(before, after);
}

#[test]
fn test_registration_is_idempotent() {
    init_test_logging();
    let mut registry = TypeRegistry::new();
    let int = registry.by_tag(Tag::Int);

    let packed = pack(&make_vector(false, int));
    assert_eq!(registry.lookup_type(&packed), TypeId::INVALID);

    let first = registry.create_type(&packed);
    let second = registry.create_type(&packed);
    assert_eq!(first, id(17));
    assert_eq!(first, second);
    assert_eq!(registry.lookup_type(&packed), first);
    assert_eq!(registry.len(), 17);
}

#[test]
fn test_semantic_dedup_of_independent_builds() {
    let mut registry = TypeRegistry::new();
    let key = registry.by_tag(Tag::String);
    let value = registry.by_basic(Tag::Real, true);

    let a = registry.register(&make_map(false, key, value));
    let b = registry.register(&make_map(false, key, value));
    assert_eq!(a, b);

    // Variant members are a set: order and duplicates do not matter.
    let nil = registry.by_tag(Tag::Nil);
    let v1 = registry.register(&make_variant(false, &set(&[key, nil, value])));
    let v2 = registry.register(&make_variant(false, &set(&[value, key, nil, key])));
    assert_eq!(v1, v2);

    // Constness is part of the identity.
    let c = registry.register(&make_map(true, key, value));
    assert_ne!(a, c);
}

#[test]
fn test_variant_function_map_scenario() {
    let mut registry = TypeRegistry::new();
    let int = registry.by_tag(Tag::Int);
    let nil = registry.by_tag(Tag::Nil);
    let string = registry.by_tag(Tag::String);
    let any = registry.by_tag(Tag::Any);
    let boolean = registry.by_tag(Tag::Bool);

    let variant = make_variant(false, &set(&[int, nil, string, any]));
    let v0 = registry.register(&variant);
    assert_eq!(v0, id(17));

    let function = make_function(false, v0, &[v0, v0, v0, boolean]);
    let v1 = registry.register(&function);
    assert_eq!(v1, id(18));

    let map = make_map(false, v1, v0);
    let v2 = registry.register(&map);
    assert_eq!(v2, id(19));

    assert_eq!(registry.register(&map), v2);
    assert_eq!(registry.register(&function), v1);
    assert_eq!(registry.len(), 19);

    assert_eq!(registry.get_variant_types(v0), Ok(vec![nil, int, string, any]));
    assert_eq!(registry.get_function_return_type(v1), Ok(v0));
    assert_eq!(
        registry.get_function_param_types(v1),
        Ok(vec![v0, v0, v0, boolean])
    );
    assert_eq!(registry.get_map_key_type(v2), Ok(v1));
    assert_eq!(registry.get_map_value_type(v2), Ok(v0));
    assert_eq!(
        registry.display(v2).to_string(),
        "map<func(variant<nil | int | string | any>, variant<nil | int | string | any>, \
         variant<nil | int | string | any>, bool) -> variant<nil | int | string | any>, \
         variant<nil | int | string | any>>"
    );
}

#[test]
fn test_large_const_array() {
    let mut registry = TypeRegistry::new();
    let real = registry.by_tag(Tag::Real);
    let array = registry.register(&make_array(true, 2_000_000_000, real));

    assert_eq!(registry.tag(array), Some(Tag::Array));
    assert!(registry.is_const(array));
    assert_eq!(registry.get_array_size(array), Ok(2_000_000_000));
    assert_eq!(registry.get_array_type(array), Ok(real));
    assert_eq!(
        registry.unpack(array),
        Ok(Unpacked {
            tag: Tag::Array,
            is_const: true,
            type1: Some(real),
            type2: None,
            size: 2_000_000_000,
            type_list: vec![],
        })
    );
}

#[test]
fn test_inline_and_stashed_entries_decode_alike() {
    let mut registry = TypeRegistry::new();
    let int = registry.by_tag(Tag::Int);
    let byte = registry.by_tag(Tag::Byte);

    let small = pack(&make_vector(false, int));
    let small_id = registry.create_type(&small);
    assert_eq!(registry.stash_len(), 0);

    let fields = [int, byte, int, byte, int, byte, int, byte];
    let large = pack(&make_tuple(false, &fields));
    assert!(large.len() > 4);
    let large_id = registry.create_type(&large);
    assert_eq!(registry.stash_len(), large.len());

    assert_eq!(registry.get_vector_type(small_id), Ok(int));
    assert_eq!(registry.get_tuple_types(large_id), Ok(fields.to_vec()));
    assert_eq!(registry.packed(small_id), Ok(small));
    assert_eq!(registry.packed(large_id), Ok(large));
}

#[test]
fn test_stashed_entries_do_not_overlap() {
    let mut registry = TypeRegistry::new();
    let ids: Vec<_> = (1..=16).map(id).collect();

    let first = pack(&make_package(false, &ids[..10]));
    let second = pack(&make_package(true, &ids[6..]));
    let a = registry.create_type(&first);
    let b = registry.create_type(&second);

    assert_eq!(registry.stash_len(), first.len() + second.len());
    assert_eq!(registry.get_package_types(a), Ok(ids[..10].to_vec()));
    assert_eq!(registry.get_package_types(b), Ok(ids[6..].to_vec()));
    assert!(registry.is_const(b));
}

#[test]
fn test_unpack_then_pack_returns_stored_bytes() {
    let mut registry = TypeRegistry::new();
    let int = registry.by_tag(Tag::Int);
    let real = registry.by_basic(Tag::Real, true);
    let samples = [
        make_int(true),
        make_array(false, 300, int),
        make_vector(true, real),
        make_map(false, int, real),
        make_tuple(false, &[]),
        make_package(false, &[int, real, int]),
        make_variant(true, &set(&[real, int])),
        make_function(false, int, &[]),
    ];
    for stir in samples {
        let packed = pack(&stir);
        let id = registry.create_type(&packed);
        assert!(registry.is_valid(id), "rejected {:?}", stir);
        assert_eq!(registry.unpack(id).unwrap().pack(), packed);
    }
}

#[test]
fn test_malformed_encodings_are_rejected() {
    init_test_logging();
    let mut registry = TypeRegistry::new();

    let cases: [(&[u8], StError); 9] = [
        // Tag values 0 and 31 are not tags.
        (&[0x00], DecodeError::UnknownTag { value: 0 }.into()),
        (&[0x1F], DecodeError::UnknownTag { value: 0x1F }.into()),
        // Lone tag byte claiming a padding nibble.
        (&[0x25], DecodeError::LengthFlagMismatch { len: 1 }.into()),
        // vector<#5> with a dirty padding nibble.
        (&[0x2B, 0x53], DecodeError::NonZeroPadding { value: 3 }.into()),
        // vector with two operands.
        (&[0x0B, 0x56], DecodeError::TrailingNibbles { remaining: 1 }.into()),
        // int followed by a stray operand.
        (&[0x25, 0x00], DecodeError::TrailingNibbles { remaining: 1 }.into()),
        // vector<#5> written with a needlessly long integer.
        (&[0x0B, 0x85], DecodeError::NonCanonical.into()),
        // variant members out of order.
        (&[0x29, 0x23, 0x10], DecodeError::NonCanonical.into()),
        // int with the unused top bit set.
        (&[0x85], DecodeError::NonCanonical.into()),
    ];
    for (bytes, expected) in cases {
        let packed = raw(bytes);
        assert_eq!(registry.try_create_type(&packed), Err(expected), "{:02x?}", bytes);
        assert_eq!(registry.create_type(&packed), TypeId::INVALID);
        assert_eq!(registry.lookup_type(&packed), TypeId::INVALID);
    }
    assert_eq!(registry.len(), 16);
}

#[test]
fn test_truncated_operands_are_rejected() {
    let mut registry = TypeRegistry::new();
    // map with a key but no value: [Map|odd][5][pad]
    let packed = raw(&[0x2C, 0x50]);
    assert_eq!(
        registry.try_create_type(&packed),
        Err(DecodeError::Truncated { offset: 1 }.into())
    );
}

#[test]
fn test_unregistered_operands_are_rejected_when_checked() {
    let mut registry = TypeRegistry::with_options(RegistryOptions {
        check_operands: true,
        ..RegistryOptions::default()
    });
    let packed = pack(&make_vector(false, id(500)));
    assert_eq!(
        registry.try_create_type(&packed),
        Err(StError::UnknownIdentifier {
            id: id(500),
            len: 16
        })
    );
    assert_eq!(
        registry.try_create_type(&pack(&make_vector(false, TypeId::INVALID))),
        Err(StError::UnknownIdentifier {
            id: TypeId::INVALID,
            len: 16
        })
    );
    assert_eq!(registry.len(), 16);
}

#[test]
fn test_dangling_operands_register_by_default() {
    init_test_logging();
    let mut registry = TypeRegistry::new();
    assert!(!registry.options().check_operands);

    let array = registry.create_type(&pack(&make_array(true, 2_000_000_000, id(100))));
    assert_eq!(array, id(17));
    let view = registry.unpack(array).unwrap();
    assert!(view.is_const);
    assert_eq!(view.size, 2_000_000_000);
    assert_eq!(view.type1, Some(id(100)));
    assert_eq!(registry.packed(array), Ok(pack(&make_array(true, 2_000_000_000, id(100)))));

    let int = registry.by_tag(Tag::Int);
    let first = registry.create_type(&pack(&make_map(false, int, id(40))));
    let second = registry.create_type(&pack(&make_map(false, int, id(40))));
    assert!(!first.is_invalid());
    assert_eq!(first, second);
    assert_eq!(registry.get_map_value_type(first), Ok(id(40)));

    let dangling = registry.register(&make_vector(false, id(500)));
    assert_eq!(registry.display(dangling).to_string(), "vector<<invalid #500>>");
}

#[test]
fn test_display_of_self_reference_is_cut_off() {
    let mut registry = TypeRegistry::new();
    let looping = registry.register(&make_vector(false, id(17)));
    assert_eq!(looping, id(17));
    assert_eq!(
        registry.display(looping).to_string(),
        format!("{}...{}", "vector<".repeat(65), ">".repeat(65))
    );
}

#[test]
fn test_display_of_shared_operands_is_bounded() {
    let mut registry = TypeRegistry::with_options(RegistryOptions {
        check_operands: true,
        ..RegistryOptions::default()
    });
    let mut pair = registry.by_tag(Tag::Int);
    for _ in 0..30 {
        pair = registry.register(&make_tuple(false, &[pair, pair]));
        assert!(!pair.is_invalid());
    }
    assert_eq!(registry.len(), 16 + 30);

    let shown = registry.display(pair).to_string();
    let innermost = format!("{}int, int), (int, int))", "(".repeat(30));
    assert!(shown.starts_with(&innermost), "{}", shown);
    assert!(shown.contains("..."));
    assert!(shown.len() < 4096, "display produced {} bytes", shown.len());
}

#[test]
fn test_accessors_check_shape() {
    let mut registry = TypeRegistry::new();
    let int = registry.by_tag(Tag::Int);
    let array = registry.register(&make_array(false, 4, int));

    assert_eq!(
        registry.get_vector_type(array),
        Err(StError::ShapeMismatch {
            id: array,
            expected: "vector",
            found: Tag::Array,
        })
    );
    assert_eq!(
        registry.get_function_param_types(int),
        Err(StError::ShapeMismatch {
            id: int,
            expected: "function",
            found: Tag::Int,
        })
    );
    // Tuple and package share a layout but not a shape.
    let tuple = registry.register(&make_tuple(false, &[int]));
    assert!(registry.get_package_types(tuple).is_err());
    assert_eq!(registry.get_tuple_types(tuple), Ok(vec![int]));
}

#[test]
fn test_unknown_identifiers() {
    let registry = TypeRegistry::new();
    let missing = id(999);

    assert!(!registry.is_valid(missing));
    assert!(!registry.is_valid(TypeId::INVALID));
    assert_eq!(registry.tag(missing), None);
    assert_eq!(registry.tag(TypeId::INVALID), None);
    assert!(!registry.is_const(missing));
    assert_eq!(
        registry.get_tuple_types(missing),
        Err(StError::UnknownIdentifier {
            id: missing,
            len: 16
        })
    );
    assert!(registry.unpack(TypeId::INVALID).is_err());
    assert!(registry.packed(missing).is_err());
}

#[test]
fn test_display() {
    let mut registry = TypeRegistry::new();
    let int = registry.by_tag(Tag::Int);
    let boolean = registry.by_tag(Tag::Bool);
    let nil = registry.by_tag(Tag::Nil);
    let string = registry.by_tag(Tag::String);
    let real = registry.by_tag(Tag::Real);
    let char_ = registry.by_tag(Tag::Char);

    let mut show = |stir: Stir| {
        let id = registry.register(&stir);
        registry.display(id).to_string()
    };
    assert_eq!(show(make_array(false, 4, int)), "[int; 4]");
    assert_eq!(show(make_vector(false, char_)), "vector<char>");
    assert_eq!(show(make_map(false, string, int)), "map<string, int>");
    assert_eq!(show(make_tuple(false, &[int, boolean])), "(int, bool)");
    assert_eq!(show(make_package(false, &[int, real])), "package {int, real}");
    assert_eq!(show(make_variant(false, &set(&[int, nil]))), "variant<nil | int>");
    assert_eq!(
        show(make_function(false, nil, &[int, boolean])),
        "func(int, bool) -> nil"
    );
    assert_eq!(show(make_vector(true, int)), "const vector<int>");

    assert_eq!(
        registry.display(registry.by_basic(Tag::Real, true)).to_string(),
        "const real"
    );
    assert_eq!(registry.display(TypeId::INVALID).to_string(), "<invalid #0>");
}

#[test]
fn test_scoped_names() {
    let mut registry = TypeRegistry::new();
    let int = registry.by_tag(Tag::Int);
    let ints = registry.register(&make_vector(false, int));

    let mut global = ScopedNames::new();
    assert!(global.create_name(&registry, "Int", int));
    assert!(global.create_name(&registry, "Ints", ints));
    assert!(!global.create_name(&registry, "Int", ints));
    assert!(!global.create_name(&registry, "Ghost", id(500)));
    assert_eq!(global.len(), 2);

    let mut local = global.child();
    assert!(local.create_name(&registry, "Int", ints));
    assert_eq!(local.find_by_name("Int"), ints);
    assert_eq!(local.find_by_name("Ints"), ints);
    assert_eq!(local.find_by_name("Missing"), TypeId::INVALID);

    let inner = local.child();
    assert_eq!(inner.find_by_name("Int"), ints);
    assert!(inner.is_empty());

    assert_eq!(global.find_by_name("Int"), int);
}
