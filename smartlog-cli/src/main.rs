//src/main.rs
mod cli;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use std::io::{self, stdout, Write};

use smartlog_lib::{
    calendar, history, Exercise, LogService, Session, SessionIndex, TemplateCreate, WorkoutFlow,
    MONTH_NAMES, WEEKDAY_NAMES,
};

/// Two-character cell glyphs for contribution heat levels 0..=3.
const HEAT_GLYPHS: [&str; 4] = ["··", "░░", "▒▒", "▓▓"];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // --- Check for completion generation request FIRST ---
    let cli_args = cli::parse_args();
    if let cli::Commands::GenerateCompletion { shell } = &cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();
        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(*shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    let service = LogService::initialize().context("Failed to initialize smartlog service")?;

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Exercises => {
            let catalog = service.exercises().await;
            render_exercises(&catalog);
        }
        cli::Commands::Sessions { limit } => {
            let sessions = service.sessions().await;
            render_sessions(&sessions, limit);
        }
        cli::Commands::Calendar { year, month } => {
            let today = Local::now().date_naive();
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            if !(1..=12).contains(&month) {
                bail!("Month must be between 1 and 12, got {month}.");
            }
            let sessions = service.sessions().await;
            let index = SessionIndex::build(&sessions);
            render_month(year, month - 1, &index)?;
        }
        cli::Commands::Graph { year } => {
            let year = year.unwrap_or_else(|| Local::now().year());
            let sessions = service.sessions().await;
            let index = SessionIndex::build(&sessions);
            render_contribution_graph(year, &index)?;
        }
        cli::Commands::Chart { exercise } => {
            let sessions = service.sessions().await;
            render_chart(&sessions, &exercise);
        }
        cli::Commands::Log {
            template,
            custom,
            date,
        } => {
            run_log(&service, template, custom, date).await?;
        }
        cli::Commands::Template { command } => {
            run_template_command(&service, command).await?;
        }
        cli::Commands::SetFields {
            exercise_id,
            visible,
        } => {
            service.update_field_config(exercise_id, visible).await?;
            println!("Updated visible fields for exercise {exercise_id}.");
        }
    }

    Ok(())
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn bold(text: impl ToString) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn render_exercises(catalog: &[Exercise]) {
    if catalog.is_empty() {
        println!("No exercises found.");
        return;
    }
    let mut table = new_table();
    table.set_header(vec![
        bold("ID"),
        bold("Name"),
        bold("Category"),
        bold("Type"),
        bold("Metric 1"),
        bold("Metric 2"),
        bold("Metric 3"),
    ]);
    for exercise in catalog {
        table.add_row(vec![
            Cell::new(exercise.id),
            Cell::new(&exercise.name),
            Cell::new(&exercise.category),
            Cell::new(exercise.category_type),
            Cell::new(format!(
                "{} ({})",
                exercise.metric1_name,
                exercise.metric1_units.join("/")
            )),
            Cell::new(format!(
                "{} ({})",
                exercise.metric2_name,
                exercise.metric2_units.join("/")
            )),
            Cell::new(exercise.metric3_name.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

fn render_sessions(sessions: &[Session], limit: Option<usize>) {
    if sessions.is_empty() {
        println!("No sessions logged yet.");
        return;
    }
    let mut table = new_table();
    table.set_header(vec![bold("Date"), bold("Name"), bold("Sets")]);
    let shown = limit.unwrap_or(sessions.len());
    for session in sessions.iter().take(shown) {
        table.add_row(vec![
            Cell::new(session.date.format("%Y-%m-%d")),
            Cell::new(&session.name),
            Cell::new(session.sets.len()),
        ]);
    }
    println!("{table}");
}

/// Month calendar: rows of 7 (Sun..Sat), days with sessions marked `*`.
fn render_month(year: i32, month_index: u32, index: &SessionIndex) -> Result<()> {
    let cells = calendar::month_cells(year, month_index)?;
    println!("{} {}", MONTH_NAMES[month_index as usize], year);

    let mut table = new_table();
    table.set_header(WEEKDAY_NAMES.iter().map(bold).collect::<Vec<_>>());
    for week in cells.chunks(7) {
        let mut row: Vec<Cell> = week
            .iter()
            .map(|cell| match cell {
                None => Cell::new(""),
                Some(day) => {
                    let marked = NaiveDate::from_ymd_opt(year, month_index + 1, *day)
                        .is_some_and(|date| index.count_by_date(date) > 0);
                    if marked {
                        Cell::new(format!("{day}*")).add_attribute(Attribute::Bold)
                    } else {
                        Cell::new(day)
                    }
                }
            })
            .collect();
        while row.len() < 7 {
            row.push(Cell::new(""));
        }
        table.add_row(row);
    }
    println!("{table}");
    println!("* = day with at least one workout");

    for date in index
        .dates()
        .filter(|d| d.year() == year && d.month0() == month_index)
    {
        let names: Vec<&str> = index
            .sessions_on(date)
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        println!("  {}: {}", date.format("%d"), names.join(", "));
    }
    Ok(())
}

/// GitHub-style heatmap: 7 weekday rows, one two-character cell per week.
fn render_contribution_graph(year: i32, index: &SessionIndex) -> Result<()> {
    let grid = calendar::year_grid(year, index)?;

    // Month label header, one slot of two characters per week column.
    let labels = grid.month_label_columns();
    let mut header = vec![b' '; grid.weeks * 2];
    for (col, name) in labels {
        let start = col * 2;
        for (i, byte) in name.bytes().enumerate() {
            if start + i < header.len() {
                header[start + i] = byte;
            }
        }
    }
    println!("{year}");
    println!("    {}", String::from_utf8_lossy(&header));

    for row in 0..7 {
        let mut line = String::with_capacity(grid.weeks * 2);
        for col in 0..grid.weeks {
            let cell = grid.cell(col, row);
            let level = smartlog_lib::YearGrid::heat_level(cell.count);
            line.push_str(HEAT_GLYPHS[level as usize]);
        }
        println!("{} {line}", WEEKDAY_NAMES[row]);
    }
    println!("    {} = none  {} = 1  {} = 2  {} = 3+", HEAT_GLYPHS[0], HEAT_GLYPHS[1], HEAT_GLYPHS[2], HEAT_GLYPHS[3]);
    Ok(())
}

fn render_chart(sessions: &[Session], exercise: &str) {
    let points = history::max_metric1_by_date(sessions, exercise);
    if points.is_empty() {
        println!("No numeric data for '{exercise}'.");
        let available = history::exercises_with_metric1(sessions);
        if !available.is_empty() {
            println!("Chartable exercises: {}", available.join(", "));
        }
        return;
    }
    let unit = history::metric1_unit_for(sessions, exercise).unwrap_or_default();
    let mut table = new_table();
    table.set_header(vec![bold("Date"), bold(format!("Best ({unit})"))]);
    for (date, value) in points {
        table.add_row(vec![
            Cell::new(date.format("%Y-%m-%d")),
            Cell::new(value),
        ]);
    }
    println!("{table}");
}

fn render_summary(session: &Session) {
    println!("\nWorkout saved: '{}' on {}", session.name, session.date.format("%Y-%m-%d"));
    let mut table = new_table();
    table.set_header(vec![
        bold("Exercise"),
        bold("Set"),
        bold("Metric 1"),
        bold("Metric 2"),
        bold("Metric 3"),
    ]);
    for set in &session.sets {
        table.add_row(vec![
            Cell::new(&set.exercise),
            Cell::new(set.set_number),
            Cell::new(format_metric(&set.metric1_value, &set.metric1_unit)),
            Cell::new(format_metric(&set.metric2_value, &set.metric2_unit)),
            Cell::new(format_metric(&set.metric3_value, &set.metric3_unit)),
        ]);
    }
    println!("{table}");
}

fn format_metric(value: &Option<String>, unit: &Option<String>) -> String {
    match (value, unit) {
        (Some(v), Some(u)) => format!("{v} {u}"),
        (Some(v), None) => v.clone(),
        (None, _) => "-".to_string(),
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// The interactive Setup -> Logging -> Summary loop.
async fn run_log(
    service: &LogService,
    template: Option<String>,
    custom: bool,
    date: Option<NaiveDate>,
) -> Result<()> {
    let catalog = service.exercises().await;
    if catalog.is_empty() {
        bail!("Exercise catalog is empty or unreachable; cannot start a workout.");
    }

    // --- Setup ---
    let target = if custom { None } else { template.as_deref() };
    let workout_name = target.map_or_else(|| "Custom Workout".to_string(), str::to_string);
    let mut exercise_list = service.resolve_workout_exercises(target, &catalog).await;

    if exercise_list.is_empty() {
        println!("Add exercises one per line (blank line to finish):");
        loop {
            let name = prompt("> ")?;
            if name.is_empty() {
                break;
            }
            if !catalog.iter().any(|e| e.name == name) {
                println!("Unknown exercise '{name}'; see `smartlog exercises`.");
                continue;
            }
            if exercise_list.iter().any(|e| *e == name) {
                println!("'{name}' is already in this workout.");
                continue;
            }
            exercise_list.push(name);
        }
    }
    if exercise_list.is_empty() {
        bail!("Cannot start logging without at least one exercise.");
    }

    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let prefill = service.prefill_sets(&exercise_list, &catalog).await;

    let mut flow = WorkoutFlow::new();
    flow.start_logging(workout_name, date, exercise_list.clone(), prefill)?;

    // --- Logging ---
    for name in &exercise_list {
        let Some(definition) = catalog.iter().find(|e| e.name == *name) else {
            continue;
        };
        edit_exercise_sets(&mut flow, definition)?;
    }

    // --- Finish: POST must complete before the summary is shown ---
    loop {
        let payload = flow.begin_save()?;
        match service.save_session(&payload).await {
            Ok(session) => {
                flow.save_succeeded(session)?;
                break;
            }
            Err(e) => {
                flow.save_failed()?;
                eprintln!("Failed to save workout: {e:#}");
                let answer = prompt("Retry save? (y/N): ")?;
                if !answer.eq_ignore_ascii_case("y") {
                    flow.back_to_setup()?;
                    println!("Workout discarded.");
                    return Ok(());
                }
            }
        }
    }

    // --- Summary ---
    if let WorkoutFlow::Summary(summary) = &flow {
        render_summary(&summary.session);
    }
    flow.done()?;
    Ok(())
}

/// Prompts through each set row of one exercise, then offers add/remove for
/// multi-set categories.
fn edit_exercise_sets(flow: &mut WorkoutFlow, definition: &Exercise) -> Result<()> {
    println!("\n== {} ({}) ==", definition.name, definition.category_type);

    let count = flow
        .logging()
        .map_or(0, |s| s.sets_for(&definition.name).len());
    for index in 0..count {
        edit_set_row(flow, definition, index)?;
    }

    if definition.category_type.is_single_entry() {
        return Ok(());
    }
    loop {
        let answer = prompt("(a)dd set, (r)emove last, or Enter to continue: ")?;
        let state = flow
            .logging_mut()
            .context("Logging state vanished mid-edit")?;
        match answer.as_str() {
            "a" => {
                state.add_set(definition)?;
                let last = state.sets_for(&definition.name).len() - 1;
                edit_set_row(flow, definition, last)?;
            }
            "r" => {
                if let Err(e) = state.remove_last_set(&definition.name) {
                    println!("{e}");
                }
            }
            "" => break,
            other => println!("Unrecognized option '{other}'."),
        }
    }
    Ok(())
}

fn edit_set_row(flow: &mut WorkoutFlow, definition: &Exercise, index: usize) -> Result<()> {
    let current = flow
        .logging()
        .and_then(|s| s.sets_for(&definition.name).get(index).cloned())
        .context("Set row vanished mid-edit")?;
    println!("Set {}:", current.set_number);

    let hint = current.metric1_value.as_deref().unwrap_or("-");
    let unit = current.metric1_unit.as_deref().unwrap_or("");
    let input = prompt(&format!(
        "  {} [{hint}] {unit} (value, 'bw', or Enter to keep): ",
        definition.metric1_name
    ))?;
    let state = flow
        .logging_mut()
        .context("Logging state vanished mid-edit")?;
    if input.eq_ignore_ascii_case("bw") {
        state.toggle_bodyweight(&definition.name, index)?;
    } else if !input.is_empty() {
        state.set_mut(&definition.name, index)?.metric1_value = Some(input);
    }

    let hint = current.metric2_value.as_deref().unwrap_or("-");
    let unit = current.metric2_unit.as_deref().unwrap_or("");
    let input = prompt(&format!(
        "  {} [{hint}] {unit} (value or Enter to keep): ",
        definition.metric2_name
    ))?;
    if !input.is_empty() {
        let state = flow
            .logging_mut()
            .context("Logging state vanished mid-edit")?;
        state.set_mut(&definition.name, index)?.metric2_value = Some(input);
    }

    if definition.has_metric3() {
        let name = definition
            .metric3_name
            .clone()
            .or_else(|| {
                definition
                    .category_type
                    .field_metadata()
                    .metric3_name
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Metric 3".to_string());
        let hint = current.metric3_value.as_deref().unwrap_or("-");
        let input = prompt(&format!("  {name} [{hint}] (value or Enter to keep): "))?;
        if !input.is_empty() {
            let state = flow
                .logging_mut()
                .context("Logging state vanished mid-edit")?;
            state.set_mut(&definition.name, index)?.metric3_value = Some(input);
        }
    }
    Ok(())
}

async fn run_template_command(service: &LogService, command: cli::TemplateCommands) -> Result<()> {
    match command {
        cli::TemplateCommands::List => {
            let templates = service.templates().await;
            if templates.is_empty() {
                println!("No templates saved.");
                return Ok(());
            }
            let mut table = new_table();
            table.set_header(vec![bold("ID"), bold("Name"), bold("Exercises")]);
            for template in &templates {
                table.add_row(vec![
                    Cell::new(template.id),
                    Cell::new(&template.name),
                    Cell::new(template.template_exercises.len()),
                ]);
            }
            println!("{table}");
        }
        cli::TemplateCommands::Show { id } => match service.api.fetch_template(id).await {
            Ok(template) => {
                let catalog = service.exercises().await;
                println!("Template '{}' (ID {})", template.name, template.id);
                for name in smartlog_lib::template_exercise_names(&template, &catalog) {
                    println!("  - {name}");
                }
            }
            Err(e) => println!("Could not load template {id}: {e}"),
        },
        cli::TemplateCommands::Create { name, exercises } => {
            let payload = TemplateCreate {
                name,
                exercise_ids: if exercises.is_empty() {
                    None
                } else {
                    Some(exercises)
                },
            };
            let created = service.create_template(&payload).await?;
            println!("Created template '{}' (ID {}).", created.name, created.id);
        }
        cli::TemplateCommands::Rename { id, name } => {
            let updated = service.rename_template(id, name).await?;
            println!("Renamed template {id} to '{}'.", updated.name);
        }
        cli::TemplateCommands::Set {
            id,
            name,
            exercises,
        } => {
            let payload = TemplateCreate {
                name,
                exercise_ids: Some(exercises),
            };
            let updated = service.replace_template(id, &payload).await?;
            println!(
                "Updated template '{}' ({} exercises).",
                updated.name,
                updated.template_exercises.len()
            );
        }
        cli::TemplateCommands::Delete { id } => {
            service.delete_template(id).await?;
            println!("Deleted template {id}.");
        }
        cli::TemplateCommands::AddExercise { id, exercise_id } => {
            service.add_template_exercise(id, exercise_id).await?;
            println!("Added exercise {exercise_id} to template {id}.");
        }
        cli::TemplateCommands::RemoveExercise { id, exercise_id } => {
            service.remove_template_exercise(id, exercise_id).await?;
            println!("Removed exercise {exercise_id} from template {id}.");
        }
        cli::TemplateCommands::Reorder { id, exercise_ids } => {
            service.reorder_template_exercises(id, &exercise_ids).await?;
            println!("Reordered exercises of template {id}.");
        }
    }
    Ok(())
}
