//! Payloads written by older format versions decode with the layout of
//! their version.
//!
//! The bytes are assembled by hand so that each test pins the exact legacy
//! layout instead of whatever the current writer produces.

use lockstep_sim::objects::{self, Figure, NodeObject, Ship};
use lockstep_sim::prelude::*;
use lockstep_snapshot::session::{event_safety_code, object_safety_code};
use lockstep_snapshot::{ErrorKind, RestoredPopulation};
use lockstep_stream::StreamWriter;

// -- helpers -----------------------------------------------------------------

fn oid(raw: u32) -> ObjectId {
    ObjectId::new(raw).unwrap()
}

/// Object header: id and tag.
fn header(w: &mut StreamWriter, ty: ObjectType, id: u32) {
    w.push_u32(id);
    w.push_u16(ty as u16);
}

fn trailer(w: &mut StreamWriter, ty: ObjectType, id: u32) {
    w.push_u16(object_safety_code(ty, oid(id)));
}

fn decode(version: u32, w: StreamWriter) -> lockstep_snapshot::Result<RestoredPopulation> {
    let bytes = w.into_bytes();
    let factory = objects::factory();
    let mut session =
        ReadSession::with_version(&bytes, &factory, version, &SnapshotConfig::default());
    session.get_object()?;
    assert!(session.is_exhausted(), "payload not fully consumed");
    session.finish()
}

/// A woodcutter at (3, 4) whose carried-good field is written by `carried`.
fn woodcutter(carried: impl FnOnce(&mut StreamWriter)) -> StreamWriter {
    let mut w = StreamWriter::new();
    header(&mut w, ObjectType::Woodcutter, 5);
    w.push_u8(1); // player
    w.push_u16(3);
    w.push_u16(4);
    w.push_u8(2); // job state
    w.push_u32(0); // home
    carried(&mut w);
    w.push_u32(0); // event
    trailer(&mut w, ObjectType::Woodcutter, 5);
    w
}

fn only_figure(population: &RestoredPopulation) -> &Figure {
    assert_eq!(population.objects.len(), 1);
    population.objects[0].downcast_ref::<Figure>().unwrap()
}

// -- carried goods (changed in version 4) ------------------------------------

#[test]
fn v3_carried_good_is_a_raw_byte() {
    let population = decode(3, woodcutter(|w| w.push_u8(Good::Iron as u8))).unwrap();
    let figure = only_figure(&population);
    assert_eq!(figure.carried, Some(Good::Iron));
    assert_eq!(figure.pos, MapPoint::new(3, 4));
    assert_eq!(figure.player, 1);
}

#[test]
fn v3_sentinel_byte_means_empty_handed() {
    let population = decode(3, woodcutter(|w| w.push_u8(0xFF))).unwrap();
    assert_eq!(only_figure(&population).carried, None);
}

#[test]
fn v3_unknown_good_is_a_format_error() {
    let err = decode(3, woodcutter(|w| w.push_u8(0x40))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn v4_carried_good_is_an_explicit_option() {
    let population = decode(
        4,
        woodcutter(|w| {
            w.push_bool(true);
            w.push_u8(Good::Iron as u8);
        }),
    )
    .unwrap();
    assert_eq!(only_figure(&population).carried, Some(Good::Iron));

    let population = decode(4, woodcutter(|w| w.push_bool(false))).unwrap();
    assert_eq!(only_figure(&population).carried, None);
}

#[test]
fn v4_rejects_the_legacy_sentinel() {
    // 0xFF is not a valid bool in the current layout.
    let err = decode(4, woodcutter(|w| w.push_u8(0xFF))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

// -- decoration timers (added in version 3) ----------------------------------

fn tree(w: &mut StreamWriter) {
    header(w, ObjectType::Tree, 9);
    w.push_u16(1);
    w.push_u16(1);
    w.push_u16(3); // species
    w.push_u8(2); // growth stage
}

#[test]
fn v2_decorations_have_no_timer() {
    let mut w = StreamWriter::new();
    tree(&mut w);
    trailer(&mut w, ObjectType::Tree, 9);
    let population = decode(2, w).unwrap();
    let tree = population.objects[0].downcast_ref::<NodeObject>().unwrap();
    assert_eq!((tree.variant, tree.state, tree.event), (3, 2, None));
}

#[test]
fn v3_decoration_timer_points_back_at_its_tree() {
    let mut w = StreamWriter::new();
    tree(&mut w);
    w.push_u32(4); // event id
    w.push_u32(9); // owner, already registered
    w.push_u32(100); // start frame
    w.push_u32(20); // length
    w.push_u32(1); // kind
    w.push_u16(event_safety_code(EventId::new(4).unwrap()));
    trailer(&mut w, ObjectType::Tree, 9);

    let population = decode(3, w).unwrap();
    let tree = population.objects[0].downcast_ref::<NodeObject>().unwrap();
    assert_eq!(tree.event, EventId::new(4));
    assert_eq!(population.events.len(), 1);
    assert_eq!(population.events[0].object, Some(oid(9)));
    assert_eq!(population.events[0].target_gf(), 120);
}

// -- sizes and strings (changed in version 2) --------------------------------

#[test]
fn v1_strings_and_lists_use_fixed_width_lengths() {
    let mut w = StreamWriter::new();
    header(&mut w, ObjectType::Ship, 12);
    w.push_u8(0);
    w.push_long_string("Ark");
    w.push_u16(6);
    w.push_u16(7);
    w.push_u32(0); // home flag
    w.push_u32(0); // cargo count
    w.push_u32(0); // passenger count
    w.push_u32(0); // event
    trailer(&mut w, ObjectType::Ship, 12);

    let population = decode(1, w).unwrap();
    let ship = population.objects[0].downcast_ref::<Ship>().unwrap();
    assert_eq!(ship.name, "Ark");
    assert_eq!(ship.pos, MapPoint::new(6, 7));
    assert!(ship.cargo.is_empty());
}

#[test]
fn v2_strings_and_lists_use_variable_width_lengths() {
    let mut w = StreamWriter::new();
    header(&mut w, ObjectType::Ship, 12);
    w.push_u8(0);
    w.push_string("Ark");
    w.push_u16(6);
    w.push_u16(7);
    w.push_u32(0);
    w.push_var_size(0);
    w.push_var_size(0);
    w.push_u32(0);
    trailer(&mut w, ObjectType::Ship, 12);

    let population = decode(2, w).unwrap();
    let ship = population.objects[0].downcast_ref::<Ship>().unwrap();
    assert_eq!(ship.name, "Ark");
}
