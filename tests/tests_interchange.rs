#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

//! End-to-end tests for the XML import/export pipeline.

use rstest::rstest;
use trespass::interchange::export::prepare;
use trespass::interchange::{self, Json, ModelFormat, Node, Xml, XmlOptions, decode, encode};
use trespass::model::registry::known_attributes;
use trespass::{InterchangeError, Model, Record, Scenario, Value, record};

const MODEL_XML: &str = include_str!("fixtures/model.xml");
const ANM_DATA_XML: &str = include_str!("fixtures/anm-data.xml");
const PLACEHOLDERS_XML: &str = include_str!("fixtures/placeholders.xml");

/// Export then re-import.
fn roundtrip(model: &Model) -> Model {
    let xml = interchange::to_xml(model).unwrap_or_else(|e| panic!("export failed: {e}"));
    interchange::parse(&xml).unwrap_or_else(|e| panic!("re-import failed: {e}\n{xml}"))
}

fn strings(values: &[&str]) -> Value {
    values.to_vec().into()
}

// ============================================================================
// IMPORT
// ============================================================================

#[test]
fn test_import_metadata() {
    let model = interchange::parse(MODEL_XML).unwrap();
    assert_eq!(model.system.author, "ciab-exportAsTML.py");
    assert_eq!(model.system.version, "0.5");
    assert_eq!(model.system.date.as_deref(), Some("2016-01-17T23:20:21.866232"));
    assert_eq!(model.system.id.as_deref(), Some("ciab-model"));
    assert_eq!(model.system.title, "CIAB-created TREsPASS XML model");
    assert_eq!(model.system.xmlns_xsi, "http://www.w3.org/2001/XMLSchema-instance");
    assert!(model.system.extra.is_empty());
}

#[test]
fn test_import_collections() {
    let model = interchange::parse(MODEL_XML).unwrap();
    assert_eq!(model.locations().len(), 4);
    assert_eq!(model.edges().len(), 2);
    assert_eq!(model.actors().len(), 1);
    assert_eq!(model.predicates().len(), 3);
    assert_eq!(model.policies().len(), 1);
    assert_eq!(model.processes().len(), 1);
    assert_eq!(model.items().len(), 1);
    assert_eq!(model.data().len(), 1);

    let ids: Vec<_> = model.locations().iter().map(|l| l["id"].clone()).collect();
    assert_eq!(ids, strings(&["datacenter", "rack-1", "host-1", "vm-1"]).as_list().unwrap());

    let edge = &model.edges()[1];
    assert_eq!(edge["directed"], Value::from("false"));
    assert_eq!(edge["source"], Value::from("host-1"));
}

#[test]
fn test_at_locations_are_always_lists() {
    let model = interchange::parse(MODEL_XML).unwrap();
    assert_eq!(model.data()[0]["atLocations"], strings(&["vm-1"]));
    assert_eq!(model.locations()[3]["atLocations"], strings(&["host-1", "rack-1"]));
    assert!(!model.locations()[0].contains_key("atLocations"));
}

#[test]
fn test_predicate_values_are_lists_of_tuples() {
    let model = interchange::parse(MODEL_XML).unwrap();
    let predicates = model.predicates();

    assert_eq!(
        predicates[0]["value"],
        Value::List(vec![
            strings(&["sysadmin", "userId1"]),
            strings(&["operator", "userId2"]),
            strings(&["guest", "userId3"]),
        ])
    );
    assert_eq!(
        predicates[1]["value"],
        Value::List(vec![strings(&["pwd1", "userId1"])])
    );
    assert_eq!(
        predicates[2]["value"],
        Value::List(vec![strings(&["sysadmin"]), strings(&["operator"])])
    );
}

#[test]
fn test_nested_policy_fields() {
    let model = interchange::parse(MODEL_XML).unwrap();
    let policy = &model.policies()[0];
    let credentials = policy["credentials"].as_record().unwrap();
    let cred_data = credentials["credData"].as_record().unwrap();
    assert_eq!(cred_data["name"], Value::from("password"));
    assert_eq!(cred_data["variable"], Value::from("X"));

    let enabled = policy["enabled"].as_record().unwrap();
    assert_eq!(enabled["in"].as_record().unwrap()["loc"], Value::from("vm-1"));
}

#[test]
fn test_singleton_collection_becomes_list() {
    let model = interchange::parse(
        r#"<system id="m"><actors><actor id="eve"><atLocations>hall</atLocations></actor></actors></system>"#,
    )
    .unwrap();
    assert_eq!(model.actors().len(), 1);
    assert_eq!(model.actors()[0]["id"], Value::from("eve"));
}

#[rstest]
#[case::self_closing("<system id=\"m\"><locations/></system>")]
#[case::whitespace("<system id=\"m\"><locations>\n\t\t</locations></system>")]
#[case::absent("<system id=\"m\"></system>")]
fn test_empty_collection_imports_empty(#[case] xml: &str) {
    let model = interchange::parse(xml).unwrap();
    assert!(model.locations().is_empty());
    assert_eq!(model.entity_count(), 0);
}

#[test]
fn test_placeholders_do_not_leak() {
    let model = interchange::parse(PLACEHOLDERS_XML).unwrap();
    assert!(model.actors().is_empty());
    assert!(model.items().is_empty());
    assert_eq!(model.locations().len(), 1);
    assert_eq!(model.locations()[0]["id"], Value::from("lobby"));

    let metric = model.system.extra["metric"].as_record().unwrap();
    assert_eq!(metric["value"], Value::from("1000"));
}

#[test]
fn test_anm_data_is_parsed() {
    let model = interchange::parse(ANM_DATA_XML).unwrap();
    let anm = model.system.anm_data.as_ref().and_then(Value::as_record).unwrap();
    let embedded = anm["system"].as_record().unwrap();
    assert_eq!(embedded["id"], Value::Null);
    assert_eq!(embedded["title"], Value::from("embedded"));
    assert_eq!(embedded["locations"].as_list().unwrap().len(), 2);
    assert_eq!(model.system.title, "outer");
}

#[test]
fn test_title_with_attributes_keeps_text() {
    let xml = r#"<system id="m" date="2016-02-01 10:00:00"><title lang="en">Office</title></system>"#;
    let model = interchange::parse(xml).unwrap();
    assert_eq!(model.system.title, "Office");
    let title = model.system.extra["title"].as_record().unwrap();
    assert_eq!(title["lang"], Value::from("en"));

    let back = roundtrip(&model);
    assert_eq!(back, model);

    let renamed = roundtrip(&model.with_title("Lab"));
    assert_eq!(renamed.system.title, "Lab");
    assert_eq!(renamed.system.extra["title"].as_record().unwrap()["lang"], Value::from("en"));
}

#[test]
fn test_wrong_root_is_rejected() {
    let result = interchange::parse("<scenario id=\"s\"/>");
    assert!(matches!(result, Err(InterchangeError::Missing { kind: "element", .. })));
}

#[test]
fn test_malformed_xml_is_rejected() {
    assert!(matches!(
        interchange::parse("<system><locations></system>"),
        Err(InterchangeError::Xml(_))
    ));
    assert!(Xml::new().read(&[0xff, 0xfe]).is_err());
}

// ============================================================================
// EXPORT
// ============================================================================

fn sample_model() -> Model {
    Model::new()
        .with_id("model-id")
        .with_title("title")
        .add_location(record([("id", "location-1".into())]))
        .add_location(record([
            ("id", "location-2".into()),
            ("atLocations", strings(&["loc-1", "loc-2"])),
        ]))
        .add_predicate(record([
            ("arity", "2".into()),
            ("id", "isPasswordOf".into()),
            (
                "value",
                Value::List(vec![
                    strings(&["pred1", "user1"]),
                    strings(&["pred2", "user2"]),
                    strings(&["pred3", "user3"]),
                ]),
            ),
        ]))
}

#[test]
fn test_export_shape() {
    let xml = interchange::to_xml(&sample_model()).unwrap();

    assert_eq!(xml.matches("<location ").count(), 2);
    assert_eq!(xml.matches("<predicate ").count(), 1);
    assert_eq!(xml.matches("<atLocations>").count(), 1);
    assert!(xml.contains("<atLocations>loc-1 loc-2</atLocations>"));
    assert!(xml.contains("<value>pred2 user2</value>"));
    assert!(xml.contains("<title>title</title>"));
    assert!(!xml.contains("<0>"));
}

#[test]
fn test_export_removes_empty_collections() {
    let xml = interchange::to_xml(&sample_model()).unwrap();
    assert!(!xml.contains("<actors"));
    assert!(!xml.contains("<assets"));
    assert!(!xml.contains("<edges"));
}

#[test]
fn test_export_requires_id() {
    let model = Model::new().with_title("title");
    assert!(matches!(
        interchange::to_xml(&model),
        Err(InterchangeError::Missing { kind: "attribute", .. })
    ));
}

#[test]
fn test_export_fills_date() {
    let xml = interchange::to_xml(&sample_model()).unwrap();
    let model = interchange::parse(&xml).unwrap();
    let date = model.system.date.as_deref().unwrap();
    assert_eq!(date.len(), "2016-01-17 23:20:21".len());
}

#[rstest]
#[case::item_only(1, 0, Some(true), Some(false))]
#[case::data_only(0, 1, Some(false), Some(true))]
#[case::both(1, 1, Some(true), Some(true))]
#[case::neither(0, 0, None, None)]
fn test_assets_merge(
    #[case] items: usize,
    #[case] data: usize,
    #[case] has_item: Option<bool>,
    #[case] has_data: Option<bool>,
) {
    let mut model = Model::new().with_id("m");
    for i in 0..items {
        model = model.add_item(record([("id", format!("item-{i}").into())]));
    }
    for i in 0..data {
        model = model.add_data(record([("id", format!("data-{i}").into())]));
    }

    let document = prepare(&model).unwrap();
    let system = document.node.as_element().unwrap();
    let assets = system.child("assets").and_then(Node::as_element);
    assert_eq!(assets.map(|a| a.child("item").is_some()), has_item);
    assert_eq!(assets.map(|a| a.child("data").is_some()), has_data);

    let back = roundtrip(&model);
    assert_eq!(back.items().len(), items);
    assert_eq!(back.data().len(), data);
}

#[test]
fn test_custom_indentation() {
    let options = XmlOptions {
        indent_char: b' ',
        indent_size: 2,
        declaration: false,
    };
    let bytes = Xml::with_options(options).write(&sample_model()).unwrap();
    let xml = String::from_utf8(bytes).unwrap();
    assert!(xml.starts_with("<system "));
    assert!(xml.contains("\n  <title>title</title>"));
}

// ============================================================================
// ROUND TRIP
// ============================================================================

#[test]
fn test_roundtrip_sample_model() {
    let model = sample_model().with_date("2016-01-17 23:20:21");
    let back = roundtrip(&model);

    assert_eq!(back.locations().len(), 2);
    assert_eq!(back.locations()[1]["atLocations"], strings(&["loc-1", "loc-2"]));
    assert_eq!(back.predicates()[0]["value"].as_list().unwrap().len(), 3);
    assert!(back.actors().is_empty());
    assert_eq!(back, model);
}

#[rstest]
#[case::full(MODEL_XML)]
#[case::anm_data(ANM_DATA_XML)]
#[case::placeholders(PLACEHOLDERS_XML)]
fn test_import_export_import_is_stable(#[case] xml: &str) {
    let first = interchange::parse(xml).unwrap();
    let second = roundtrip(&first);

    // export stamps undated models
    let first = match (&first.system.date, &second.system.date) {
        (None, Some(stamped)) => first.with_date(stamped.clone()),
        _ => first,
    };
    assert_eq!(first, second);
}

#[test]
fn test_empty_nested_record_comes_back_as_empty_text() {
    let model = Model::new()
        .with_id("m")
        .with_date("2016-02-01 10:00:00")
        .add_policy(record([("id", "p".into()), ("enabled", Value::Record(Record::new()))]));
    let xml = interchange::to_xml(&model).unwrap();
    assert!(xml.contains("<enabled/>"));

    let back = roundtrip(&model);
    assert_eq!(back.policies()[0]["enabled"], Value::from(""));
}

#[test]
fn test_plain_string_tuples_are_split_on_reimport() {
    let model = Model::new().with_id("m").add_predicate(record([
        ("id", "isPasswordOf".into()),
        ("arity", "2".into()),
        ("value", strings(&["pred1 user1", "pred2 user2"])),
    ]));
    let back = roundtrip(&model);
    assert_eq!(
        back.predicates()[0]["value"],
        Value::List(vec![strings(&["pred1", "user1"]), strings(&["pred2", "user2"])])
    );
}

#[test]
fn test_text_and_attributes_on_one_element() {
    let model = Model::new().with_id("m").with_date("2016-02-01 10:00:00").add_actor(record([
        ("id", "eve".into()),
        (
            "note",
            Value::Record(record([("lang", "en".into()), ("_text", "insider".into())])),
        ),
    ]));
    let xml = interchange::to_xml(&model).unwrap();
    assert!(xml.contains("<lang>en</lang>"));
    assert_eq!(roundtrip(&model), model);
}

#[rstest]
#[case("location")]
#[case("actor")]
#[case("edge")]
#[case("item")]
#[case("data")]
#[case("predicate")]
#[case("policy")]
#[case("process")]
fn test_attribute_child_symmetry(#[case] singular: &str) {
    let names = known_attributes(singular).unwrap();
    let mut entity: Record = names
        .iter()
        .map(|name| ((*name).into(), Value::from(format!("{name}-value"))))
        .collect();
    entity.insert("comment".into(), "free text".into());

    let plural = trespass::model::collection_names()
        .find(|p| trespass::model::singular(p) == Some(singular))
        .unwrap();
    let model = Model::new().with_id("m").add_to_collection(plural, entity.clone()).unwrap();

    let document = decode(&interchange::to_xml(&model).unwrap()).unwrap();
    let system = document.node.as_element().unwrap();
    let container = trespass::model::registry::descriptor(plural).unwrap().container;
    let node = system
        .child(container)
        .and_then(Node::as_element)
        .and_then(|c| c.child(singular))
        .and_then(Node::as_element)
        .unwrap();

    let attributes: Vec<_> = node.attributes.keys().map(|k| k.as_ref()).collect();
    assert_eq!(attributes, names);
    assert!(node.child("comment").is_some());

    let back = interchange::parse(&encode(&document, &XmlOptions::default()).unwrap()).unwrap();
    let imported = &back.collection(plural).unwrap()[0];
    assert_eq!(imported, &entity);
}

// ============================================================================
// OTHER FORMATS
// ============================================================================

#[test]
fn test_xml_to_json_and_back() {
    let model = interchange::parse(MODEL_XML).unwrap();
    let json = Json.write(&model).unwrap();
    assert_eq!(Json.read(&json).unwrap(), model);
}

#[test]
fn test_scenario_xml() {
    let scenario = Scenario::new()
        .with_id("scenario-1")
        .with_model("model-file-name.xml")
        .with_asset_goal("attackerId", "assetId", None);
    let xml = interchange::scenario_to_xml(&scenario).unwrap();

    let document = decode(&xml).unwrap();
    assert_eq!(document.root.as_ref(), "scenario");
    let root = document.node.as_element().unwrap();
    assert_eq!(root.child("model"), Some(&Node::text("model-file-name.xml")));
    assert!(root.attributes.contains_key("date"));

    let goal = root.child("assetGoal").and_then(Node::as_element).unwrap();
    assert_eq!(goal.attributes["attacker"], Value::from("attackerId"));
    assert_eq!(goal.attributes["profit"], Value::from("0"));
    assert_eq!(goal.child("asset"), Some(&Node::text("assetId")));
}

#[test]
fn test_scenario_requires_id() {
    let scenario = Scenario::new().with_model("model.xml");
    assert!(interchange::scenario_to_xml(&scenario).is_err());
}
