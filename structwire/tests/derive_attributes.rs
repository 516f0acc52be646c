//! Exercises `#[derive(Reflected)]`'s field/struct attributes end to end:
//! `skip`, `getter`/`setter` property slots, `readonly` activator-only
//! slots, and `MapperBuilder::indirect_activation`.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use structwire::{MapperBuilder, SlotKind};
use structwire_derive::Reflected;

fn get_score(v: &ProfileRecord) -> &i32 {
	&v.score
}
fn set_score(v: &mut ProfileRecord, value: i32) {
	v.score = value;
}

#[derive(Reflected, Debug, Default, PartialEq)]
struct ProfileRecord {
	#[structwire(getter = "get_score", setter = "set_score")]
	score: i32,
	name: String,
	#[structwire(skip)]
	cache: i32,
}

#[test]
fn property_slot_round_trips_through_getter_and_setter() {
	let mapping = MapperBuilder::<ProfileRecord>::new()
		.values(&[("score", SlotKind::Property)])
		.public_fields()
		.build()
		.unwrap();
	assert_eq!(mapping.values.len(), 2, "skipped `cache` must not appear");
	structwire::StructSerializer::define_struct::<ProfileRecord, _>(|b| {
		b.values(&[("score", SlotKind::Property)]).public_fields()
	})
	.unwrap();

	let value = ProfileRecord {
		score: 42,
		name: "ada".to_owned(),
		cache: 999,
	};
	let mut buf = vec![0u8; structwire::get_size_from_value(&value).unwrap() as usize];
	structwire::serialize(&value, &mut buf, &mut 0).unwrap();
	let decoded = structwire::deserialize::<ProfileRecord>(&buf, &mut 0).unwrap();
	assert_eq!(decoded.score, 42);
	assert_eq!(decoded.name, "ada");
	assert_eq!(decoded.cache, 0, "skipped field is left at its Default value");
}

#[derive(Reflected, Debug, Default, PartialEq)]
#[structwire(constructor(args = "id"))]
struct TicketRecord {
	#[structwire(readonly)]
	id: i32,
	notes: String,
}

#[test]
fn readonly_slot_is_only_reachable_through_the_constructor() {
	let err = MapperBuilder::<TicketRecord>::new()
		.values(&[("id", SlotKind::Field)])
		.build()
		.unwrap_err();
	assert!(matches!(err.kind(), structwire::MappingErrorKind::InvalidMapping { .. }));

	structwire::define_struct::<TicketRecord, _>(|b| b.parametrized_activation(&["id"]).public_fields()).unwrap();

	let value = TicketRecord {
		id: 7,
		notes: "ok".to_owned(),
	};
	let mut buf = vec![0u8; structwire::get_size_from_value(&value).unwrap() as usize];
	structwire::serialize(&value, &mut buf, &mut 0).unwrap();
	assert_eq!(structwire::deserialize::<TicketRecord>(&buf, &mut 0).unwrap(), value);
}

#[derive(Reflected, Debug, PartialEq)]
#[structwire(no_default)]
struct PooledRecord {
	count: i32,
}

#[test]
fn indirect_activation_uses_a_caller_supplied_factory() {
	structwire::define_struct::<PooledRecord, _>(|b| {
		b.indirect_activation(Arc::new(|| PooledRecord { count: -1 }))
			.public_fields()
	})
	.unwrap();

	let value = PooledRecord { count: 5 };
	let mut buf = vec![0u8; structwire::get_size_from_value(&value).unwrap() as usize];
	structwire::serialize(&value, &mut buf, &mut 0).unwrap();
	let decoded = structwire::deserialize::<PooledRecord>(&buf, &mut 0).unwrap();
	assert_eq!(decoded, value, "post-construction write overwrites the factory's placeholder");
}

#[test]
fn register_schema_runs_its_loader_exactly_once() {
	use std::sync::atomic::{AtomicUsize, Ordering};
	static CALLS: AtomicUsize = AtomicUsize::new(0);

	for _ in 0..3 {
		structwire::register_schema("derive_attributes::profile_group", || {
			CALLS.fetch_add(1, Ordering::SeqCst);
			Ok(())
		})
		.unwrap();
	}
	assert_eq!(CALLS.load(Ordering::SeqCst), 1);
}
