//! Subtype resolution tests: explicit subtypes, generator and container
//! subtypes, and object literals.

mod common;

use common::specimen;
use specimen::select;
use specimen::{
    from_fn, ContainerSpec, Error, GenerationError, Mode, Object, ScalarKind, Settings, TypeRef,
    Value,
};

fn type_name(value: &Value) -> Option<&str> {
    value.as_object().map(|obj| obj.type_name.as_str())
}

#[test]
fn test_abstract_without_subtype_is_null() -> anyhow::Result<()> {
    let person = specimen("Person").create()?;

    assert_eq!(person.get("favorite"), Some(&Value::Null));
    let pets = person
        .get("pets")
        .and_then(Value::as_elements)
        .expect("Missing pets");
    assert!(pets.iter().all(Value::is_null));
    Ok(())
}

#[test]
fn test_member_subtype() -> anyhow::Result<()> {
    let person = specimen("Person")
        .subtype(select::field("Person", "favorite"), TypeRef::named("Dog"))?
        .create()?;

    let favorite = person.get("favorite").expect("Missing favorite");
    assert_eq!(type_name(favorite), Some("Dog"));
    assert!(favorite.get("good").and_then(Value::as_bool).is_some());
    assert!(favorite.get("name").and_then(Value::as_str).is_some());
    Ok(())
}

#[test]
fn test_type_subtype_applies_to_elements() -> anyhow::Result<()> {
    let person = specimen("Person")
        .subtype(select::all(TypeRef::named("Animal")), TypeRef::named("Cat"))?
        .create()?;

    let pets = person
        .get("pets")
        .and_then(Value::as_elements)
        .expect("Missing pets");
    assert!(!pets.is_empty());
    for pet in pets {
        assert_eq!(type_name(pet), Some("Cat"));
        assert!(pet.get("lives").and_then(Value::as_i32).is_some());
    }
    assert_eq!(type_name(person.get("favorite").expect("Missing favorite")), Some("Cat"));
    Ok(())
}

#[test]
fn test_field_selector_matches_implementing_type() -> anyhow::Result<()> {
    let person = specimen("Person")
        .subtype(select::all(TypeRef::named("Animal")), TypeRef::named("Dog"))?
        .set(select::field("Animal", "name"), "Rex")
        .create()?;

    let pets = person
        .get("pets")
        .and_then(Value::as_elements)
        .expect("Missing pets");
    assert!(pets
        .iter()
        .all(|pet| pet.get("name").and_then(Value::as_str) == Some("Rex")));
    Ok(())
}

#[test]
fn test_object_literal() -> anyhow::Result<()> {
    let tom = Object::new("Cat").with("name", "Tom").with("lives", 9);
    let person = specimen("Person")
        .set(select::field("Person", "favorite"), tom.clone())
        .create()?;

    assert_eq!(person.get("favorite"), Some(&Value::Object(tom)));
    Ok(())
}

#[test]
fn test_invalid_subtype() -> anyhow::Result<()> {
    let result = specimen("Person")
        .subtype(select::field("Person", "favorite"), TypeRef::named("Address"))?
        .create();

    match result {
        Err(Error::Generation(GenerationError::InvalidSubtype {
            path,
            declared,
            subtype,
        })) => {
            assert_eq!(path, "root.favorite");
            assert_eq!(declared, TypeRef::named("Animal"));
            assert_eq!(subtype, TypeRef::named("Address"));
        }
        other => panic!("Expected InvalidSubtype, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_unknown_subtype_rejected_upfront() {
    let result = specimen("Person").subtype(select::field("Person", "favorite"), TypeRef::named("Fish"));
    assert!(result.is_err());
}

#[test]
fn test_container_subtype() -> anyhow::Result<()> {
    let holder = specimen("Holder")
        .container(
            select::field("Holder", "tags"),
            ContainerSpec::new()
                .size(3)
                .subtype(TypeRef::set(ScalarKind::String)),
        )
        .create()?;

    match holder.get("tags") {
        Some(Value::Set(tags)) => assert_eq!(tags.len(), 3),
        other => panic!("Expected a set, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_generator_subtype_must_be_assignable() {
    let result = specimen("Person")
        .generate(
            select::field("Person", "age"),
            from_fn(|_| 1).with_subtype(TypeRef::named("Address")),
        )
        .create();

    match result {
        Err(Error::Generation(GenerationError::InvalidSubtype { path, .. })) => {
            assert_eq!(path, "root.age")
        }
        other => panic!("Expected InvalidSubtype, got {other:?}"),
    }
}

#[test]
fn test_unused_subtype_in_strict_mode() -> anyhow::Result<()> {
    let result = specimen("Address")
        .with_settings(Settings::default().with_mode(Mode::Strict))
        .subtype(select::field("Person", "favorite"), TypeRef::named("Dog"))?
        .create();

    match result {
        Err(Error::Generation(GenerationError::UnusedSelectors(unused))) => {
            assert_eq!(unused, vec!["subtype field(Person, favorite)".to_string()])
        }
        other => panic!("Expected UnusedSelectors, got {other:?}"),
    }
    Ok(())
}
