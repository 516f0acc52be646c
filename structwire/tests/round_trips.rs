//! End-to-end scenarios exercising the full pipeline — derive, map, compile,
//! interpret — against the concrete wire-format examples the spec calls out.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use structwire_derive::Reflected;

#[derive(Reflected, Debug, Default, PartialEq)]
struct RoundTripPoint {
	x: i32,
	y: i32,
}

#[test]
fn point_matches_spec_scenario_1() {
	structwire::define_struct::<RoundTripPoint, _>(|b| b.public_fields()).unwrap();

	let point = RoundTripPoint { x: 7, y: -3 };
	let size = structwire::get_size_from_value(&point).unwrap();
	assert_eq!(size, 8);

	let mut buf = vec![0u8; size as usize];
	structwire::serialize(&point, &mut buf, &mut 0).unwrap();
	assert_eq!(buf, [0x07, 0x00, 0x00, 0x00, 0xFD, 0xFF, 0xFF, 0xFF]);

	assert_eq!(structwire::get_size_from_buffer::<RoundTripPoint>(&buf, 0).unwrap(), 8);
	assert_eq!(structwire::deserialize::<RoundTripPoint>(&buf, &mut 0).unwrap(), point);
}

#[derive(Reflected, Debug, Default, PartialEq)]
struct RoundTripOpt {
	a: Option<i32>,
	b: i32,
}

#[test]
fn absent_optional_matches_spec_scenario_2() {
	structwire::define_struct::<RoundTripOpt, _>(|b| b.public_fields()).unwrap();

	let value = RoundTripOpt { a: None, b: 1 };
	let size = structwire::get_size_from_value(&value).unwrap();
	assert_eq!(size, 5);

	let mut buf = vec![0u8; size as usize];
	structwire::serialize(&value, &mut buf, &mut 0).unwrap();
	assert_eq!(buf, [0x01, 0x01, 0x00, 0x00, 0x00]);
	assert_eq!(structwire::deserialize::<RoundTripOpt>(&buf, &mut 0).unwrap(), value);
}

#[test]
fn present_optional_matches_spec_scenario_3() {
	// RoundTripOpt is already installed by the previous test; reuse it.
	structwire::StructSerializer::ensure_struct_registered::<RoundTripOpt>().unwrap();

	let value = RoundTripOpt { a: Some(42), b: 1 };
	let size = structwire::get_size_from_value(&value).unwrap();
	assert_eq!(size, 9);

	let mut buf = vec![0u8; size as usize];
	structwire::serialize(&value, &mut buf, &mut 0).unwrap();
	assert_eq!(buf, [0x00, 0x2A, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00]);
	assert_eq!(structwire::deserialize::<RoundTripOpt>(&buf, &mut 0).unwrap(), value);
}

#[derive(Reflected, Debug, Default, PartialEq)]
struct RoundTripString {
	s: String,
}

#[test]
fn string_matches_spec_scenario_4() {
	structwire::define_struct::<RoundTripString, _>(|b| b.public_fields()).unwrap();

	let value = RoundTripString { s: "Hi".to_owned() };
	let size = structwire::get_size_from_value(&value).unwrap();
	assert_eq!(size, 6);

	let mut buf = vec![0u8; size as usize];
	structwire::serialize(&value, &mut buf, &mut 0).unwrap();
	assert_eq!(buf, [0x04, 0x00, 0x48, 0x00, 0x69, 0x00]);
	assert_eq!(structwire::deserialize::<RoundTripString>(&buf, &mut 0).unwrap(), value);
}

#[derive(Reflected, Debug, Default, PartialEq)]
struct RoundTripArray {
	xs: Vec<i32>,
}

#[test]
fn array_matches_spec_scenario_5() {
	structwire::define_struct::<RoundTripArray, _>(|b| b.public_fields()).unwrap();

	let value = RoundTripArray { xs: vec![1, 2, 3] };
	let size = structwire::get_size_from_value(&value).unwrap();
	assert_eq!(size, 14);

	let mut buf = vec![0u8; size as usize];
	structwire::serialize(&value, &mut buf, &mut 0).unwrap();
	assert_eq!(
		buf,
		[0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00]
	);
	assert_eq!(structwire::deserialize::<RoundTripArray>(&buf, &mut 0).unwrap(), value);
}

#[derive(Reflected, Debug, PartialEq)]
#[structwire(constructor(args = "name, id"), no_default)]
struct RoundTripNamedCtor {
	name: String,
	id: i32,
}

#[derive(Reflected, Debug, Default, PartialEq)]
struct RoundTripNamedDefault {
	name: String,
	id: i32,
}

#[test]
fn parametrized_activation_matches_spec_scenario_6() {
	structwire::define_struct::<RoundTripNamedCtor, _>(|b| b.parametrized_activation(&["name", "id"])).unwrap();
	structwire::define_struct::<RoundTripNamedDefault, _>(|b| b.public_fields()).unwrap();

	let via_ctor = RoundTripNamedCtor {
		name: "ab".to_owned(),
		id: 5,
	};
	let via_default = RoundTripNamedDefault {
		name: "ab".to_owned(),
		id: 5,
	};

	let mut ctor_buf = vec![0u8; structwire::get_size_from_value(&via_ctor).unwrap() as usize];
	structwire::serialize(&via_ctor, &mut ctor_buf, &mut 0).unwrap();

	let mut default_buf = vec![0u8; structwire::get_size_from_value(&via_default).unwrap() as usize];
	structwire::serialize(&via_default, &mut default_buf, &mut 0).unwrap();

	assert_eq!(ctor_buf, default_buf, "activator choice must not affect wire bytes");

	let decoded = structwire::deserialize::<RoundTripNamedCtor>(&ctor_buf, &mut 0).unwrap();
	assert_eq!(decoded, via_ctor);
}

#[test]
fn unmatched_constructor_hints_fail_at_map_time() {
	#[derive(Reflected, Debug, Default)]
	struct NoSuchCtor {
		a: i32,
	}

	let err = structwire::map::<NoSuchCtor>()
		.parametrized_activation(&["a", "b"])
		.build()
		.unwrap_err();
	assert!(matches!(
		err.kind(),
		structwire::MappingErrorKind::NoMatchingConstructor { .. }
	));
}

#[derive(Reflected, Debug, Default, PartialEq)]
struct RoundTripInner {
	a: i32,
}

#[derive(Reflected, Debug, Default, PartialEq)]
struct RoundTripOuter {
	inner: RoundTripInner,
	tag: String,
}

#[test]
fn nested_record_slot_lazily_registers_the_inner_type() {
	structwire::define_struct::<RoundTripOuter, _>(|b| b.public_fields()).unwrap();
	assert!(structwire::supports_type::<RoundTripInner>());

	let value = RoundTripOuter {
		inner: RoundTripInner { a: 9 },
		tag: "x".to_owned(),
	};
	let mut buf = vec![0u8; structwire::get_size_from_value(&value).unwrap() as usize];
	structwire::serialize(&value, &mut buf, &mut 0).unwrap();
	assert_eq!(structwire::deserialize::<RoundTripOuter>(&buf, &mut 0).unwrap(), value);
}

#[derive(Reflected, Debug, Default, PartialEq)]
struct RoundTripMap {
	entries: HashMap<String, i32>,
}

#[test]
fn map_slot_round_trips() {
	structwire::define_struct::<RoundTripMap, _>(|b| b.public_fields()).unwrap();

	let mut entries = HashMap::new();
	entries.insert("one".to_owned(), 1);
	entries.insert("two".to_owned(), 2);
	let value = RoundTripMap { entries };

	let size = structwire::get_size_from_value(&value).unwrap();
	let mut buf = vec![0u8; size as usize];
	structwire::serialize(&value, &mut buf, &mut 0).unwrap();
	assert_eq!(structwire::get_size_from_buffer::<RoundTripMap>(&buf, 0).unwrap(), size);
	assert_eq!(structwire::deserialize::<RoundTripMap>(&buf, &mut 0).unwrap(), value);
}

#[test]
fn deserialize_into_reuses_an_existing_instance() {
	structwire::StructSerializer::ensure_struct_registered::<RoundTripPoint>().unwrap();

	let value = RoundTripPoint { x: 11, y: 22 };
	let mut buf = vec![0u8; structwire::get_size_from_value(&value).unwrap() as usize];
	structwire::serialize(&value, &mut buf, &mut 0).unwrap();

	let mut pooled = RoundTripPoint { x: -1, y: -1 };
	structwire::deserialize_into(&mut pooled, &buf, &mut 0).unwrap();
	assert_eq!(pooled, value);
}

#[derive(Reflected, Debug, Default, PartialEq)]
struct RoundTripTagged {
	value: i32,
}

#[test]
fn tagged_round_trip_dispatches_by_specialization_id() {
	structwire::define_struct::<RoundTripTagged, _>(|b| b.public_fields()).unwrap();
	structwire::StructSerializer::specialize::<RoundTripTagged>().unwrap();

	let value = RoundTripTagged { value: 99 };
	let mut buf = vec![0u8; 2 + structwire::get_size_from_value(&value).unwrap() as usize];
	structwire::StructSerializer::serialize_tagged(&value, &mut buf, &mut 0).unwrap();

	let (_, boxed) = structwire::StructSerializer::deserialize_tagged(&buf, &mut 0).unwrap();
	assert_eq!(*boxed.downcast::<RoundTripTagged>().unwrap(), value);
}

#[derive(Reflected, Debug, Default, PartialEq)]
struct RoundTripReSpecialize {
	value: i32,
}

#[test]
fn re_specializing_a_type_fails() {
	structwire::StructSerializer::ensure_struct_registered::<RoundTripReSpecialize>().unwrap();
	structwire::StructSerializer::specialize::<RoundTripReSpecialize>().unwrap();
	let err = structwire::StructSerializer::specialize::<RoundTripReSpecialize>().unwrap_err();
	assert!(matches!(err.kind(), structwire::MappingErrorKind::AlreadySpecialized { .. }));
}

#[test]
fn buffer_too_small_is_reported_rather_than_panicking() {
	structwire::StructSerializer::ensure_struct_registered::<RoundTripPoint>().unwrap();
	let value = RoundTripPoint { x: 1, y: 2 };
	let mut undersized = vec![0u8; 3];
	let err = structwire::serialize(&value, &mut undersized, &mut 0).unwrap_err();
	assert!(matches!(
		err.kind(),
		structwire::CodecErrorKind::BufferTooSmall { .. }
	));
}
