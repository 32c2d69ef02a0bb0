use chrono::NaiveDate;

use servint::{
    config::PlannerConfig,
    core::record::{RecordError, VehicleRecord},
    operation::Operation,
    types::{Span, ValidationError},
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn oil_change() -> Operation {
    Operation::new("Oil change", 10_000.0, Span::from_years(1.0).unwrap()).unwrap()
}

fn logged_vehicle() -> VehicleRecord {
    let mut car = VehicleRecord::new("Sedan", date(2006, 11, 30));
    car.add_operation_to_log(
        oil_change()
            .complete(98_042.0, date(2015, 12, 5), "Price: 4000 RUR")
            .unwrap(),
    )
    .unwrap();
    car
}

#[test]
fn absolute_plan_projects_from_last_completion() {
    let mut car = logged_vehicle();
    let plan = car.make_maintenance_plan(None, false).unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].label(), "Oil change");
    assert!(plan[0].is_done());
    assert_eq!(plan[0].done_at_km(), Some(108_042.0));
    assert_eq!(plan[0].done_on(), Some(date(2016, 12, 4)));
}

#[test]
fn plan_does_not_touch_the_catalogue() {
    let mut car = logged_vehicle();
    let before = car.get_periodic("Oil change").unwrap().clone();
    let _ = car.make_maintenance_plan(None, false).unwrap();
    let _ = car.make_maintenance_plan(None, true).unwrap();
    assert_eq!(car.get_periodic("Oil change").unwrap(), &before);
}

#[test]
fn relative_plan_reports_remaining_and_overdue_distance() {
    let mut car = logged_vehicle();

    let plan = car.make_maintenance_plan(Some(100_042.0), true).unwrap();
    assert_eq!(car.haul(), 100_042.0);
    assert_eq!(plan[0].done_at_km(), Some(8_000.0));

    let plan = car.make_maintenance_plan(Some(110_000.0), true).unwrap();
    assert_eq!(plan[0].done_at_km(), Some(-1_958.0));
}

#[test]
fn plan_rejects_invalid_haul_before_updating() {
    let mut car = logged_vehicle();
    car.set_haul(100_000.0).unwrap();

    let err = car.make_maintenance_plan(Some(-10.0), true).unwrap_err();
    assert_eq!(err, RecordError::Invalid(ValidationError::Distance(-10.0)));
    assert_eq!(car.haul(), 100_000.0);
}

#[test]
fn plan_is_sorted_by_planned_distance() {
    let mut car = VehicleRecord::new("Van", date(2010, 1, 1));
    let belt = Operation::new("Timing belt", 90_000.0, Span::from_years(5.0).unwrap()).unwrap();
    let oil = oil_change();
    let brake = Operation::new("Brake fluid", 40_000.0, Span::from_years(2.0).unwrap()).unwrap();
    car.add_operation_to_cat(&belt).unwrap();
    car.add_operation_to_log(oil.complete(52_000.0, date(2015, 6, 1), "").unwrap()).unwrap();
    car.add_operation_to_log(brake.complete(20_000.0, date(2012, 6, 1), "").unwrap()).unwrap();

    let plan = car.make_maintenance_plan(Some(55_000.0), true).unwrap();
    let summary: Vec<(&str, Option<f64>)> = plan
        .iter()
        .map(|op| (op.label(), op.done_at_km()))
        .collect();
    assert_eq!(
        summary,
        [
            ("Brake fluid", Some(5_000.0)),
            ("Oil change", Some(7_000.0)),
            ("Timing belt", Some(35_000.0)),
        ]
    );
}

#[test]
fn cleared_catalogue_plans_from_production_baseline() {
    let mut car = logged_vehicle();
    car.clear_log();

    let plan = car.make_maintenance_plan(None, false).unwrap();
    assert_eq!(plan[0].done_at_km(), Some(10_000.0));
    assert_eq!(plan[0].done_on(), Some(date(2007, 11, 30)));
}

#[test]
fn configured_plan_uses_default_relativity() {
    let mut car = logged_vehicle();
    car.set_haul(100_000.0).unwrap();

    let relative = car.plan_with(&PlannerConfig::default()).unwrap();
    let absolute = car.plan_with(&PlannerConfig { relative: false }).unwrap();
    assert_eq!(relative[0].done_at_km(), Some(8_042.0));
    assert_eq!(absolute[0].done_at_km(), Some(108_042.0));
}

#[test]
fn duration_only_operations_are_not_forecast() {
    let mut car = logged_vehicle();
    let insurance = Operation::new("Insurance", 0.0, Span::from_years(1.0).unwrap()).unwrap();
    car.add_operation_to_log(insurance.complete(98_500.0, date(2016, 2, 1), "").unwrap()).unwrap();

    let plan = car.make_maintenance_plan(None, false).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].label(), "Oil change");
}
