// File: crates/logbook-core/tests/charts.rs
// Purpose: Chart options: ticks, thresholds, cascading configuration and option flags.

mod common;

use logbook_core::chart::{build_ticks, set_option};
use logbook_core::period::epoch_millis;
use logbook_core::{
    render, Chart, ChartError, ChartKind, Configuration, Directive, Direction, ExperienceTable, Material, Relation, Table,
};
use serde_json::{json, Map};

fn option_of(kind: ChartKind, relation: &Relation, directive: Directive, configuration: &Configuration) -> logbook_core::ChartOption {
    let rules = common::rules();
    let table = Table::new(kind, relation, directive, common::context(configuration, &rules)).unwrap();
    let chart = Chart::new(&table);
    chart.option().unwrap().clone()
}

fn fleet() -> Relation {
    common::roster(&[
        (1.0, "Fubuki", "DD", 10.0, 4_500.0),
        (2.0, "Shirayuki", "DD", 20.0, 19_000.0),
        (3.0, "Hatsuyuki", "DD", 30.0, 43_500.0),
        (4.0, "Kongou", "FBB", 85.0, 450_000.0),
        (5.0, "Hiei", "FBB", 60.0, 180_000.0),
    ])
}

#[test]
fn ticks_span_both_ends() {
    assert_eq!(build_ticks(0.0, 10.0, 3.0, None).unwrap(), vec![0.0, 3.0, 6.0, 9.0, 10.0]);
    assert_eq!(build_ticks(0.0, 10.0, 2.0, None).unwrap(), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    assert_eq!(build_ticks(5.0, 5.0, 1.0, None).unwrap(), vec![5.0]);

    for (minimum, maximum, step) in [(0.0, 1.0, 0.1), (60.0, 86.0, 10.0), (-5.0, 17.5, 2.5)] {
        let ticks = build_ticks(minimum, maximum, step, None).unwrap();
        assert_eq!(ticks.len(), ((maximum - minimum) / step - 1e-9).ceil() as usize + 1);
        assert_eq!(ticks.first(), Some(&minimum));
        assert_eq!(ticks.last(), Some(&maximum));
        assert!(ticks.windows(2).all(|w| w[0] < w[1]), "{ticks:?}");
    }
}

#[test]
fn ticks_reject_bad_steps_and_ranges() {
    assert!(matches!(build_ticks(0.0, 10.0, 0.0, None), Err(ChartError::InvalidConfiguration { .. })));
    assert!(matches!(build_ticks(0.0, 10.0, -1.0, None), Err(ChartError::InvalidConfiguration { .. })));
    assert!(matches!(build_ticks(10.0, 0.0, 1.0, None), Err(ChartError::InvalidConfiguration { .. })));
}

#[test]
fn mapped_ticks_move_to_experience_space() {
    let experience = ExperienceTable::default();
    let ticks = build_ticks(1.0, 3.0, 1.0, Some(&experience)).unwrap();
    assert_eq!(ticks, vec![0.0, 100.0, 300.0]);
}

#[test]
fn mapped_ticks_stop_at_the_last_tabulated_level() {
    let experience = ExperienceTable::default();
    let ticks = build_ticks(90.0, 120.0, 5.0, Some(&experience)).unwrap();
    assert!(ticks.windows(2).all(|w| w[0] < w[1]), "{ticks:?}");
    assert_eq!(ticks.first(), Some(&experience.experience_at(90.0)));
    assert_eq!(ticks.last(), Some(&1_000_000.0));

    assert_eq!(build_ticks(100.0, 150.0, 5.0, Some(&experience)).unwrap(), vec![1_000_000.0]);
}

#[test]
fn ticks_reject_steps_too_fine_for_the_range() {
    let result = build_ticks(0.0, 1_000_000.0, 1e-9, None);
    assert!(matches!(result, Err(ChartError::InvalidConfiguration { .. })));
    assert!(build_ticks(0.0, 10_000.0, 1.0, None).is_ok());
}

#[test]
fn experience_maximum_past_the_table_covers_the_roster() {
    let configuration = common::configuration_with(
        "chart.Ship.Experiences.vertical",
        json!({ "minimum": 90, "maximum": 150, "step": 10 }),
    );
    let relation = common::roster(&[
        (1.0, "Yamato", "BB", 120.0, 1_300_000.0),
        (2.0, "Musashi", "BB", 95.0, 900_000.0),
    ]);
    let option = option_of(ChartKind::Scatter, &relation, Directive::with_option("Experiences", "Arrival"), &configuration);

    let rules = common::rules();
    let vertical = option.vertical.as_ref().expect("vertical axis");
    assert_eq!(vertical.minimum, Some(rules.experience.experience_at(90.0)));
    assert_eq!(vertical.maximum, Some(1_300_000.0));
    let ticks = vertical.ticks.as_ref().expect("ticks");
    assert!(ticks.windows(2).all(|w| w[0] < w[1]), "{ticks:?}");
    assert_eq!(ticks.last(), Some(&1_000_000.0));
}

#[test]
fn experience_axis_subdivides_level_steps() {
    let configuration = common::configuration();
    let option = option_of(ChartKind::Scatter, &fleet(), Directive::with_option("Experiences", "Arrival"), &configuration);

    let vertical = option.vertical.as_ref().expect("vertical axis");
    assert_eq!(vertical.minimum, Some(0.0));
    assert_eq!(vertical.maximum, Some(4_500.0));
    let ticks = vertical.ticks.as_ref().expect("ticks");
    assert_eq!(ticks.len(), 10);
    assert_eq!(ticks, &vec![0.0, 100.0, 300.0, 600.0, 1_000.0, 1_500.0, 2_100.0, 2_800.0, 3_600.0, 4_500.0]);
    assert!(vertical.extra.get("minorGridlines").is_none());

    assert_eq!(option.extra.get("continuous"), Some(&json!(false)));
    assert!(option.horizontal.is_none());
}

#[test]
fn level_axis_uses_roster_extremes() {
    let configuration = common::configuration_with("chart.Ship.vertical", json!({ "step": 10, "minorGridlines": 4 }));
    let option = option_of(ChartKind::Scatter, &fleet(), Directive::with_option("Levels", "Arrival"), &configuration);

    let vertical = option.vertical.as_ref().expect("vertical axis");
    assert_eq!(vertical.minimum, Some(10.0));
    assert_eq!(vertical.maximum, Some(86.0));
    assert_eq!(vertical.ticks, Some(vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 86.0]));
    assert_eq!(vertical.extra.get("minorGridlines"), Some(&json!(4)));
}

#[test]
fn continuous_scatter_gets_an_order_axis() {
    let configuration = common::configuration_patched(&[
        ("chart.Scatter.continuous", json!(true)),
        ("chart.Ship.horizontal", json!({ "step": 2 })),
    ]);
    let option = option_of(ChartKind::Scatter, &fleet(), Directive::with_option("Levels", "Experiences"), &configuration);

    let horizontal = option.horizontal.as_ref().expect("horizontal axis");
    assert_eq!(horizontal.minimum, Some(1.0));
    assert_eq!(horizontal.maximum, Some(5.0));
    assert_eq!(horizontal.ticks, Some(vec![1.0, 3.0, 5.0]));
}

#[test]
fn candlestick_time_axis_is_period_aligned() {
    let configuration = common::configuration_with(
        "chart.Material.horizontal",
        json!({ "minimum": "2024-01-01 13:00" }),
    );
    let relation = common::material_log(
        Material::Fuel,
        &[
            (common::at(2024, 1, 1, 6), Some(10.0)),
            (common::at(2024, 1, 1, 18), Some(20.0)),
            (common::at(2024, 1, 2, 18), Some(15.0)),
        ],
    );
    let option = option_of(ChartKind::Candlestick, &relation, Directive::with_option("Fuel", "Daily"), &configuration);

    assert_eq!(option.title, "Materials (Fuel)");
    let vertical = option.vertical.as_ref().expect("vertical axis");
    assert_eq!((vertical.minimum, vertical.maximum), (Some(0.0), Some(20.0)));
    assert_eq!(vertical.ticks, Some(vec![0.0, 20.0]));

    let horizontal = option.horizontal.as_ref().expect("horizontal axis");
    assert_eq!(horizontal.minimum, Some(epoch_millis(common::at(2024, 1, 1, 0))));
    assert_eq!(horizontal.maximum, Some(epoch_millis(common::at(2024, 1, 2, 0))));
    assert_eq!(option.extra.get("hollowIsRising"), Some(&json!(true)));
}

#[test]
fn unparseable_time_threshold_is_reported() {
    let configuration = common::configuration_with("chart.Material.horizontal", json!({ "maximum": "soon" }));
    let rules = common::rules();
    let relation = common::material_log(Material::Fuel, &[(common::at(2024, 1, 1, 6), Some(10.0))]);
    let table = Table::new(
        ChartKind::Candlestick,
        &relation,
        Directive::with_option("Fuel", "Daily"),
        common::context(&configuration, &rules),
    )
    .unwrap();
    let chart = Chart::new(&table);
    assert_eq!(chart.option().unwrap_err(), ChartError::InvalidTimestamp("soon".into()));
}

#[test]
fn line_carries_the_opposite_baseline() {
    let configuration = common::configuration_with("chart.Material.Repair", json!({ "vertical": { "minimum": 10 } }));
    let relation = common::resource_log(&[
        (common::at(2024, 1, 1, 6), [Some(100.0), Some(200.0), Some(300.0), Some(400.0), Some(5.0)]),
        (common::at(2024, 1, 2, 6), [Some(150.0), Some(250.0), Some(350.0), Some(450.0), Some(6.0)]),
    ]);
    let option = option_of(ChartKind::Line, &relation, Directive::with_option("Resources", "Daily"), &configuration);

    let vertical = option.vertical.as_ref().expect("vertical axis");
    assert_eq!(vertical.maximum, Some(450.0));
    assert_eq!(vertical.minimum, Some(0.0));
    assert_eq!(vertical.baseline, None);
    assert_eq!(vertical.opposing_baseline, Some(10.0));
    assert_eq!(option.title, "Resources");
}

#[test]
fn bubble_axes_are_bound_to_their_columns() {
    let configuration = common::configuration_with(
        "chart.Bubble",
        json!({ "vertical": { "minimum": 0 }, "horizontal": { "maximum": 10, "baseline": 1 } }),
    );
    let option = option_of(ChartKind::Bubble, &fleet(), Directive::kind_only("Levels"), &configuration);

    let vertical = option.vertical.as_ref().expect("vertical axis");
    assert_eq!((vertical.minimum, vertical.maximum), (Some(0.0), Some(73.0)));
    assert_eq!(vertical.ticks, Some(vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 73.0]));

    let horizontal = option.horizontal.as_ref().expect("horizontal axis");
    assert_eq!((horizontal.minimum, horizontal.maximum), (Some(2.0), Some(10.0)));
    assert_eq!(horizontal.baseline, Some(1.0));
    assert_eq!(horizontal.ticks, None);
}

#[test]
fn histogram_axis_and_bucket_size() {
    let configuration = common::configuration_with(
        "chart.Ship.Levels",
        json!({ "horizontal": { "minimum": 0, "maximum": 100, "step": 25 } }),
    );
    let option = option_of(ChartKind::Histogram, &fleet(), Directive::kind_only("Levels"), &configuration);

    let horizontal = option.horizontal.as_ref().expect("horizontal axis");
    assert_eq!(horizontal.ticks, Some(vec![0.0, 25.0, 50.0, 75.0, 100.0]));
    assert!(option.vertical.is_none());
    assert_eq!(option.extra.get("bucketSize"), Some(&json!(5)));
}

#[test]
fn unconfigured_axes_are_omitted() {
    let configuration = common::configuration();
    let option = option_of(ChartKind::Histogram, &fleet(), Directive::kind_only("Experiences"), &configuration);
    assert!(option.horizontal.is_none());
    assert!(option.vertical.is_none());
}

#[test]
fn cascade_merges_field_by_field() {
    let configuration = common::configuration();
    let section = configuration.cascade("chart.Material.Repair.vertical", "chart.Material.vertical").unwrap();
    assert_eq!(section.number("maximum"), Some(3000.0));
    assert_eq!(section.number("minimum"), Some(0.0));
    assert_eq!(section.number("step"), Some(100.0));

    let shared_only = configuration.cascade("chart.Material.Fuel.vertical", "chart.Material.vertical").unwrap();
    assert_eq!(shared_only.number("maximum"), None);
    assert_eq!(shared_only.number("step"), Some(100.0));

    assert!(configuration.cascade("chart.Nothing.vertical", "chart.Nothing.shared").is_none());
}

#[test]
fn set_option_reports_enabled_values() {
    let configuration = Configuration::from_value(json!({
        "on": true,
        "off": false,
        "none": null,
        "size": 4,
        "fallback": "auto"
    }));
    let mut target = Map::new();
    assert!(set_option(&mut target, "a", &configuration, "on", None));
    assert!(!set_option(&mut target, "b", &configuration, "off", None));
    assert!(!set_option(&mut target, "c", &configuration, "none", None));
    assert!(set_option(&mut target, "d", &configuration, "size", None));
    assert!(set_option(&mut target, "e", &configuration, "missing", Some("fallback")));
    assert!(!set_option(&mut target, "f", &configuration, "missing", None));

    assert_eq!(target.get("b"), Some(&json!(false)));
    assert_eq!(target.get("e"), Some(&json!("auto")));
    assert!(!target.contains_key("f"));
}

#[test]
fn option_is_built_once() {
    let configuration = common::configuration();
    let rules = common::rules();
    let relation = fleet();
    let table = Table::new(
        ChartKind::Bubble,
        &relation,
        Directive::kind_only("Levels"),
        common::context(&configuration, &rules),
    )
    .unwrap();
    let chart = Chart::new(&table);
    let first = chart.option().unwrap();
    let second = chart.option().unwrap();
    assert!(std::ptr::eq(first, second));
}

#[test]
fn rendering_serializes_only_present_fields() {
    let configuration = common::configuration_with("chart.Material.Repair", json!({ "vertical": { "minimum": 10 } }));
    let rules = common::rules();
    let relation = common::resource_log(&[(common::at(2024, 1, 1, 6), [Some(1.0); 5])]);
    let rendering = render(
        &relation,
        ChartKind::Line,
        Directive::with_option("Resources", "Daily"),
        common::context(&configuration, &rules),
    )
    .unwrap();

    let value = serde_json::to_value(&rendering).unwrap();
    assert_eq!(value["option"]["title"], json!("Resources"));
    assert_eq!(value["option"]["vertical"]["opposingBaseline"], json!(10.0));
    assert!(value["option"].get("horizontal").is_none());
    assert!(value["option"]["vertical"].get("baseline").is_none());
    assert_eq!(value["table"]["columns"][0], json!({ "type": "datetime", "label": "Date" }));
    assert_eq!(value["table"]["rows"][0][0]["f"], json!("2024-01-01"));
    assert_eq!(Direction::Vertical.key(), "vertical");
}
