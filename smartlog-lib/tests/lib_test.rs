// tests/lib_test.rs
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use smartlog_lib::{
    calendar::{self, iso_day},
    category_fallback, days_in_month, dedup_preserving_order, history, is_leap_year, month_cells,
    template_exercise_names, year_grid, CalendarError, CategoryKind, Exercise, FlowError, Session,
    SessionIndex, Template, TemplateExercise, WorkoutFlow, WorkoutSet, YearGrid, BODYWEIGHT_VALUE,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn make_set(exercise: &str, set_number: u32, value: Option<&str>, unit: Option<&str>) -> WorkoutSet {
    WorkoutSet {
        id: 0,
        exercise: exercise.to_string(),
        set_number,
        metric1_value: value.map(str::to_string),
        metric1_unit: unit.map(str::to_string),
        metric2_value: None,
        metric2_unit: None,
        metric3_value: None,
        metric3_unit: None,
    }
}

fn make_session(id: i64, date: NaiveDate, name: &str, sets: Vec<WorkoutSet>) -> Session {
    Session {
        id,
        name: name.to_string(),
        date,
        created_at: format!("{date}T12:00:00"),
        sets,
    }
}

fn make_exercise(id: i64, name: &str, category: &str, kind: CategoryKind) -> Exercise {
    let meta = kind.field_metadata();
    Exercise {
        id,
        name: name.to_string(),
        category: category.to_string(),
        category_type: kind,
        metric1_name: meta.metric1_name.to_string(),
        metric1_units: meta.metric1_units.iter().map(|u| (*u).to_string()).collect(),
        metric2_name: meta.metric2_name.to_string(),
        metric2_units: meta.metric2_units.iter().map(|u| (*u).to_string()).collect(),
        metric3_name: meta.metric3_name.map(str::to_string),
        metric3_units: meta
            .metric3_units
            .map(|units| units.iter().map(|u| (*u).to_string()).collect()),
        field_config: None,
    }
}

// --- Categories ---

#[test]
fn test_every_category_has_field_metadata() {
    use strum::IntoEnumIterator;
    for kind in CategoryKind::iter() {
        let meta = kind.field_metadata();
        assert!(!meta.metric1_name.is_empty());
        assert!(!meta.metric1_units.is_empty());
        assert!(!meta.metric2_name.is_empty());
        let expected = if kind.is_single_entry() { 1 } else { 5 };
        assert_eq!(kind.default_set_count(5), expected);
    }
    assert_eq!(CategoryKind::Strength.to_string(), "strength");
    assert_eq!(CategoryKind::Recovery.to_string(), "recovery");
}

// --- Calendar ---

#[test]
fn test_leap_year_rule() {
    assert!(is_leap_year(2024));
    assert!(is_leap_year(2000));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2023));
}

#[test]
fn test_days_in_february() {
    assert_eq!(days_in_month(2024, 1).unwrap(), 29);
    assert_eq!(days_in_month(2023, 1).unwrap(), 28);
    assert_eq!(days_in_month(1900, 1).unwrap(), 28);
    assert_eq!(days_in_month(2000, 1).unwrap(), 29);
}

#[test]
fn test_days_in_month_rejects_bad_input() {
    assert_eq!(days_in_month(2024, 12), Err(CalendarError::InvalidMonth(12)));
    assert_eq!(days_in_month(0, 0), Err(CalendarError::InvalidYear(0)));
    assert_eq!(days_in_month(10_000, 0), Err(CalendarError::InvalidYear(10_000)));
}

#[test]
fn test_month_cells_leading_padding_matches_first_weekday() {
    // February 2024 starts on a Thursday: 4 leading blanks, then 29 days.
    let cells = month_cells(2024, 1).unwrap();
    assert_eq!(cells.len(), 4 + 29);
    assert!(cells[..4].iter().all(Option::is_none));
    assert_eq!(cells[4], Some(1));
    assert_eq!(cells.last().copied().flatten(), Some(29));
}

#[test]
fn test_month_cells_sunday_start_has_no_padding() {
    // September 2024 starts on a Sunday.
    let cells = month_cells(2024, 8).unwrap();
    assert_eq!(cells[0], Some(1));
    assert_eq!(cells.len(), 30);
}

#[test]
fn test_month_cells_day_numbers_are_contiguous() {
    for month in 0..12 {
        let cells = month_cells(2023, month).unwrap();
        let days: Vec<u32> = cells.iter().filter_map(|c| *c).collect();
        let expected: Vec<u32> = (1..=days_in_month(2023, month).unwrap()).collect();
        assert_eq!(days, expected, "month index {month}");
    }
}

#[test]
fn test_year_grid_covers_the_whole_year_exactly_once() {
    let index = SessionIndex::build(&[]);
    let grid = year_grid(2024, &index).unwrap();

    let jan1 = day(2024, 1, 1);
    let dec31 = day(2024, 12, 31);
    assert!(grid.start <= jan1);
    let last = grid.cell(grid.weeks - 1, 6).date;
    assert!(last >= dec31);

    let in_year: Vec<NaiveDate> = grid
        .cells()
        .iter()
        .map(|c| c.date)
        .filter(|d| d.year() == 2024)
        .collect();
    assert_eq!(in_year.len(), 366);
    assert_eq!(in_year[0], jan1);
    assert_eq!(*in_year.last().unwrap(), dec31);

    // Column-major layout: row index is the weekday.
    for col in 0..grid.weeks {
        for row in 0..7 {
            assert_eq!(
                grid.cell(col, row).date.weekday().num_days_from_sunday(),
                row as u32
            );
        }
    }
}

#[test]
fn test_year_grid_counts_sessions_per_day() {
    let sessions = vec![
        make_session(1, day(2024, 3, 15), "Push Day", vec![]),
        make_session(2, day(2024, 3, 15), "Evening Run", vec![]),
    ];
    let index = SessionIndex::build(&sessions);
    let grid = year_grid(2024, &index).unwrap();
    let cell = grid
        .cells()
        .iter()
        .find(|c| c.date == day(2024, 3, 15))
        .unwrap();
    assert_eq!(cell.count, 2);
}

#[test]
fn test_year_grid_month_labels() {
    let index = SessionIndex::build(&[]);
    let grid = year_grid(2024, &index).unwrap();
    let labels = grid.month_label_columns();
    assert_eq!(labels.len(), 12);
    assert_eq!(labels.get(&0), Some(&"Jan"));
    assert!(labels.values().any(|name| *name == "Dec"));
    assert!(labels.keys().all(|col| *col < grid.weeks));
}

#[test]
fn test_heat_level_buckets() {
    assert_eq!(YearGrid::heat_level(0), 0);
    assert_eq!(YearGrid::heat_level(1), 1);
    assert_eq!(YearGrid::heat_level(2), 2);
    assert_eq!(YearGrid::heat_level(3), 3);
    assert_eq!(YearGrid::heat_level(17), 3);
}

#[test]
fn test_parse_day_ignores_time_suffix() {
    assert_eq!(
        iso_day::parse_day("2024-02-29T18:00:00Z"),
        Some(day(2024, 2, 29))
    );
    assert_eq!(iso_day::parse_day("2024-03-05"), Some(day(2024, 3, 5)));
    assert_eq!(iso_day::parse_day("bogus"), None);
    assert_eq!(iso_day::parse_day("2024-13-05"), None);
}

#[test]
fn test_session_date_decodes_from_timestamp_string() {
    let json = r#"{
        "id": 7,
        "name": "Leg Day",
        "date": "2024-02-29T23:30:00Z",
        "created_at": "2024-03-01T02:30:00Z",
        "sets": []
    }"#;
    let session: Session = serde_json::from_str(json).unwrap();
    assert_eq!(session.date, day(2024, 2, 29));
}

// --- History ---

#[test]
fn test_count_by_date_is_input_order_independent() {
    let a = make_session(1, day(2024, 5, 1), "A", vec![]);
    let b = make_session(2, day(2024, 5, 1), "B", vec![]);
    let c = make_session(3, day(2024, 5, 2), "C", vec![]);

    let forward = SessionIndex::build(&[a.clone(), b.clone(), c.clone()]);
    let backward = SessionIndex::build(&[c, b, a]);
    for date in [day(2024, 5, 1), day(2024, 5, 2), day(2024, 5, 3)] {
        assert_eq!(forward.count_by_date(date), backward.count_by_date(date));
    }
    assert_eq!(forward.count_by_date(day(2024, 5, 1)), 2);
    assert_eq!(forward.count_by_date(day(2024, 5, 3)), 0);
}

#[test]
fn test_sets_for_exercise_orders_sessions_newest_first() {
    let older = make_session(
        1,
        day(2024, 4, 1),
        "Push",
        vec![
            make_set("Bench Press", 1, Some("125"), Some("lbs")),
            make_set("Bench Press", 2, Some("130"), Some("lbs")),
        ],
    );
    let newer = make_session(
        2,
        day(2024, 4, 8),
        "Push",
        vec![
            make_set("Bench Press", 1, Some("135"), Some("lbs")),
            make_set("Overhead Press", 1, Some("85"), Some("lbs")),
        ],
    );

    let sets = history::sets_for_exercise(&[older, newer], "Bench Press");
    assert_eq!(sets.len(), 3);
    assert_eq!(sets[0].metric1_value.as_deref(), Some("135"));
    assert_eq!(sets[1].metric1_value.as_deref(), Some("125"));
    assert_eq!(sets[2].metric1_value.as_deref(), Some("130"));
}

#[test]
fn test_max_metric1_on_leap_day() {
    let session = make_session(
        1,
        day(2024, 2, 29),
        "Push",
        vec![
            make_set("Bench Press", 1, Some("135"), Some("lbs")),
            make_set("Bench Press", 2, Some("145"), Some("lbs")),
        ],
    );
    let points = history::max_metric1_by_date(&[session], "Bench Press");
    assert_eq!(points, vec![(day(2024, 2, 29), 145.0)]);
}

#[test]
fn test_max_metric1_skips_bodyweight_and_non_numeric() {
    let session = make_session(
        1,
        day(2024, 6, 3),
        "Push",
        vec![
            make_set("Pull Up", 1, Some(BODYWEIGHT_VALUE), None),
            make_set("Pull Up", 2, Some("heavy"), None),
            make_set("Pull Up", 3, Some("25"), Some("lbs")),
        ],
    );
    let points = history::max_metric1_by_date(&[session.clone()], "Pull Up");
    assert_eq!(points, vec![(day(2024, 6, 3), 25.0)]);

    // A session with only non-numeric values contributes no point.
    let bw_only = make_session(
        2,
        day(2024, 6, 4),
        "Push",
        vec![make_set("Pull Up", 1, Some(BODYWEIGHT_VALUE), None)],
    );
    let points = history::max_metric1_by_date(&[session, bw_only], "Pull Up");
    assert_eq!(points.len(), 1);
}

#[test]
fn test_max_metric1_points_ascend_by_date() {
    let sessions = vec![
        make_session(
            1,
            day(2024, 6, 10),
            "Push",
            vec![make_set("Bench Press", 1, Some("150"), Some("lbs"))],
        ),
        make_session(
            2,
            day(2024, 6, 3),
            "Push",
            vec![make_set("Bench Press", 1, Some("140"), Some("lbs"))],
        ),
    ];
    let points = history::max_metric1_by_date(&sessions, "Bench Press");
    assert_eq!(
        points,
        vec![(day(2024, 6, 3), 140.0), (day(2024, 6, 10), 150.0)]
    );
}

#[test]
fn test_exercises_with_metric1_sorted_and_deduped() {
    let sessions = vec![
        make_session(
            1,
            day(2024, 6, 3),
            "Push",
            vec![
                make_set("Squat", 1, Some("225"), Some("lbs")),
                make_set("Bench Press", 1, Some("135"), Some("lbs")),
            ],
        ),
        make_session(
            2,
            day(2024, 6, 5),
            "Push",
            vec![
                make_set("Bench Press", 1, Some("140"), Some("lbs")),
                make_set("Plank", 1, None, None),
            ],
        ),
    ];
    assert_eq!(
        history::exercises_with_metric1(&sessions),
        vec!["Bench Press".to_string(), "Squat".to_string()]
    );
}

#[test]
fn test_metric1_unit_comes_from_first_valued_set() {
    let sessions = vec![make_session(
        1,
        day(2024, 6, 3),
        "Push",
        vec![
            make_set("Bench Press", 1, None, Some("kg")),
            make_set("Bench Press", 2, Some("60"), Some("kg")),
        ],
    )];
    assert_eq!(
        history::metric1_unit_for(&sessions, "Bench Press"),
        Some("kg".to_string())
    );
    assert_eq!(history::metric1_unit_for(&sessions, "Squat"), None);
}

// --- Planner ---

fn sample_catalog() -> Vec<Exercise> {
    vec![
        make_exercise(1, "Bench Press", "Push", CategoryKind::Strength),
        make_exercise(2, "Overhead Press", "Push", CategoryKind::Strength),
        make_exercise(3, "Squat", "Legs", CategoryKind::Strength),
        make_exercise(4, "Treadmill", "Cardio Machines", CategoryKind::Cardio),
    ]
}

#[test]
fn test_category_fallback_matches_category_and_kind() {
    let catalog = sample_catalog();
    assert_eq!(
        category_fallback(&catalog, "Push"),
        vec!["Bench Press".to_string(), "Overhead Press".to_string()]
    );
    // Category-kind names match too, in catalog order.
    assert_eq!(
        category_fallback(&catalog, "strength"),
        vec![
            "Bench Press".to_string(),
            "Overhead Press".to_string(),
            "Squat".to_string()
        ]
    );
    assert!(category_fallback(&catalog, "Pull").is_empty());
}

#[test]
fn test_template_exercise_names_respects_sort_order() {
    let template = Template {
        id: 1,
        name: "Full Body".to_string(),
        created_at: String::new(),
        updated_at: String::new(),
        template_exercises: vec![
            TemplateExercise {
                exercise_id: 3,
                sort_order: 2,
            },
            TemplateExercise {
                exercise_id: 1,
                sort_order: 1,
            },
            TemplateExercise {
                exercise_id: 99,
                sort_order: 3,
            },
        ],
    };
    assert_eq!(
        template_exercise_names(&template, &sample_catalog()),
        vec!["Bench Press".to_string(), "Squat".to_string()]
    );
}

#[test]
fn test_dedup_preserving_order() {
    let names = vec![
        "Squat".to_string(),
        "Bench Press".to_string(),
        "Squat".to_string(),
    ];
    assert_eq!(
        dedup_preserving_order(names),
        vec!["Squat".to_string(), "Bench Press".to_string()]
    );
}

// --- Workout flow ---

fn start_flow(exercises: &[&str]) -> WorkoutFlow {
    let mut flow = WorkoutFlow::new();
    flow.start_logging(
        "Push".to_string(),
        day(2024, 6, 3),
        exercises.iter().map(|s| (*s).to_string()).collect(),
        HashMap::new(),
    )
    .unwrap();
    flow
}

#[test]
fn test_start_logging_requires_exercises() {
    let mut flow = WorkoutFlow::new();
    assert_eq!(
        flow.start_logging("Push".to_string(), day(2024, 6, 3), vec![], HashMap::new()),
        Err(FlowError::NoExercises)
    );
    assert!(matches!(flow, WorkoutFlow::Setup));
}

#[test]
fn test_start_logging_only_from_setup() {
    let mut flow = start_flow(&["Bench Press"]);
    assert_eq!(
        flow.start_logging(
            "Again".to_string(),
            day(2024, 6, 4),
            vec!["Squat".to_string()],
            HashMap::new()
        ),
        Err(FlowError::InvalidState("Setup"))
    );
}

#[test]
fn test_add_and_remove_sets_keep_numbers_contiguous() {
    let bench = make_exercise(1, "Bench Press", "Push", CategoryKind::Strength);
    let mut flow = start_flow(&["Bench Press"]);
    let state = flow.logging_mut().unwrap();

    state.add_set(&bench).unwrap();
    state.add_set(&bench).unwrap();
    state.add_set(&bench).unwrap();
    state.remove_last_set("Bench Press").unwrap();
    state.add_set(&bench).unwrap();

    let numbers: Vec<u32> = state
        .sets_for("Bench Press")
        .iter()
        .map(|s| s.set_number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn test_single_entry_category_rejects_extra_sets() {
    let treadmill = make_exercise(4, "Treadmill", "Cardio Machines", CategoryKind::Cardio);
    let mut flow = start_flow(&["Treadmill"]);
    let state = flow.logging_mut().unwrap();
    assert_eq!(
        state.add_set(&treadmill),
        Err(FlowError::SingleEntry("Treadmill".to_string()))
    );
}

#[test]
fn test_remove_last_set_on_empty_list_errors() {
    let mut flow = start_flow(&["Bench Press"]);
    let state = flow.logging_mut().unwrap();
    assert_eq!(
        state.remove_last_set("Bench Press"),
        Err(FlowError::NoSuchSet(0))
    );
    assert_eq!(
        state.remove_last_set("Squat"),
        Err(FlowError::UnknownExercise("Squat".to_string()))
    );
}

#[test]
fn test_bodyweight_toggle_flips_metric1() {
    let bench = make_exercise(1, "Bench Press", "Push", CategoryKind::Strength);
    let mut flow = start_flow(&["Bench Press"]);
    let state = flow.logging_mut().unwrap();
    state.add_set(&bench).unwrap();

    state.toggle_bodyweight("Bench Press", 0).unwrap();
    assert!(state.sets_for("Bench Press")[0].is_bodyweight());
    state.toggle_bodyweight("Bench Press", 0).unwrap();
    assert_eq!(state.sets_for("Bench Press")[0].metric1_value, None);
}

#[test]
fn test_save_lifecycle_guards_duplicate_submission() {
    let bench = make_exercise(1, "Bench Press", "Push", CategoryKind::Strength);
    let mut flow = start_flow(&["Bench Press"]);
    flow.logging_mut().unwrap().add_set(&bench).unwrap();

    let payload = flow.begin_save().unwrap();
    assert_eq!(payload.name, "Push");
    assert_eq!(payload.sets.len(), 1);

    // A second save and a back-navigation are both refused mid-flight.
    assert_eq!(flow.begin_save(), Err(FlowError::SaveInFlight));
    assert_eq!(flow.back_to_setup(), Err(FlowError::SaveInFlight));

    // Failure keeps the edits and re-arms the save.
    flow.save_failed().unwrap();
    assert_eq!(flow.logging().unwrap().sets_for("Bench Press").len(), 1);
    let payload = flow.begin_save().unwrap();
    assert_eq!(payload.sets.len(), 1);

    let saved = make_session(10, day(2024, 6, 3), "Push", vec![]);
    flow.save_succeeded(saved).unwrap();
    assert!(matches!(flow, WorkoutFlow::Summary(_)));

    flow.done().unwrap();
    assert!(matches!(flow, WorkoutFlow::Setup));
}

#[test]
fn test_save_succeeded_requires_in_flight_save() {
    let mut flow = start_flow(&["Bench Press"]);
    let saved = make_session(10, day(2024, 6, 3), "Push", vec![]);
    assert!(flow.save_succeeded(saved).is_err());
    assert!(flow.logging().is_some());
}

#[test]
fn test_to_session_create_flattens_in_exercise_order() {
    let bench = make_exercise(1, "Bench Press", "Push", CategoryKind::Strength);
    let squat = make_exercise(3, "Squat", "Legs", CategoryKind::Strength);
    let mut flow = start_flow(&["Bench Press", "Squat"]);
    let state = flow.logging_mut().unwrap();
    state.add_set(&bench).unwrap();
    state.add_set(&bench).unwrap();
    state.add_set(&squat).unwrap();
    state.set_mut("Bench Press", 0).unwrap().metric1_value = Some("135".to_string());

    let payload = state.to_session_create();
    let names: Vec<&str> = payload.sets.iter().map(|s| s.exercise.as_str()).collect();
    assert_eq!(names, vec!["Bench Press", "Bench Press", "Squat"]);
    assert_eq!(payload.sets[0].metric1_value.as_deref(), Some("135"));
    assert_eq!(payload.sets[0].set_number, 1);
    assert_eq!(payload.sets[1].set_number, 2);
    assert_eq!(payload.sets[2].set_number, 1);
}

#[test]
fn test_prefill_rows_flow_into_logging_state() {
    let mut prefill = HashMap::new();
    prefill.insert(
        "Bench Press".to_string(),
        vec![smartlog_lib::SetDraft {
            set_number: 1,
            metric1_value: Some("135".to_string()),
            metric1_unit: Some("lbs".to_string()),
            ..Default::default()
        }],
    );
    let mut flow = WorkoutFlow::new();
    flow.start_logging(
        "Push".to_string(),
        day(2024, 6, 3),
        vec!["Bench Press".to_string(), "Squat".to_string()],
        prefill,
    )
    .unwrap();
    let state = flow.logging().unwrap();
    assert_eq!(state.sets_for("Bench Press").len(), 1);
    assert_eq!(
        state.sets_for("Bench Press")[0].metric1_value.as_deref(),
        Some("135")
    );
    // Exercises missing from the prefill map start with no rows.
    assert!(state.sets_for("Squat").is_empty());
}
