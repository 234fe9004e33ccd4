// Visit Scheduler
// Command-line host for the rescheduling engine: prints a technician's week
// and moves single appointments through the same drag/commit path a calendar
// view uses.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};

use visit_scheduler::models::settings::SchedulerSettings;
use visit_scheduler::services::appointment::AppointmentService;
use visit_scheduler::services::reschedule::{
    DropOutcome, FeedbackLog, ProjectedGrid, RescheduleController,
};
use visit_scheduler::services::settings::SettingsService;
use visit_scheduler::services::store::SqliteAppointmentStore;
use visit_scheduler::utils::date::{week_containing, weeks_spanning, DateRange};

const USAGE: &str = "usage:
  visit-scheduler show [YYYY-MM-DD] [TECHNICIAN]
  visit-scheduler export [YYYY-MM-DD] [TECHNICIAN]
  visit-scheduler move APPOINTMENT_ID YYYY-MM-DD HOUR";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    log::info!("Starting Visit Scheduler");

    let settings = SettingsService::platform_default().load_or_default();
    let db_path = SettingsService::resolve_database_path(&settings);
    let store = SqliteAppointmentStore::open(&db_path.to_string_lossy())?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("show") | Some("export") => {
            let date = args.get(1).map(|s| parse_date(s)).transpose()?;
            let technician = args
                .get(2)
                .cloned()
                .or_else(|| settings.default_technician.clone());
            let json = args.first().map(String::as_str) == Some("export");
            show(&store, &settings, date, technician, json).await
        }
        Some("move") => {
            let (id, date, hour) = match &args[1..] {
                [id, date, hour] => (id, date, hour),
                _ => bail!("{}", USAGE),
            };
            let hour: u32 = hour
                .parse()
                .with_context(|| format!("Invalid hour: {}", hour))?;
            move_appointment(&store, &settings, id, parse_date(date)?, hour).await
        }
        Some(other) => Err(anyhow!("Unknown command {}\n{}", other, USAGE)),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| format!("Invalid date: {}", value))
}

fn week_of(date: NaiveDate) -> Result<DateRange> {
    week_containing(date).ok_or_else(|| anyhow!("No week contains {}", date))
}

async fn open_view(
    store: &SqliteAppointmentStore,
    settings: &SchedulerSettings,
    range: DateRange,
    technician: Option<String>,
) -> Result<RescheduleController<FeedbackLog>> {
    let mut controller =
        RescheduleController::new(settings.time_grid(), range, FeedbackLog::new())
            .with_technician(technician);
    controller.reconcile(store).await?;
    Ok(controller)
}

async fn show(
    store: &SqliteAppointmentStore,
    settings: &SchedulerSettings,
    date: Option<NaiveDate>,
    technician: Option<String>,
    json: bool,
) -> Result<()> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let controller = open_view(store, settings, week_of(date)?, technician).await?;
    if json {
        let data = serde_json::to_string_pretty(controller.index().appointments())
            .context("Failed to serialize appointments")?;
        println!("{}", data);
    } else {
        print_grid(&controller.projected_grid());
    }
    Ok(())
}

async fn move_appointment(
    store: &SqliteAppointmentStore,
    settings: &SchedulerSettings,
    appointment_id: &str,
    date: NaiveDate,
    hour: u32,
) -> Result<()> {
    let appointment = AppointmentService::new(store.database().connection())
        .get(appointment_id)?
        .ok_or_else(|| anyhow!("No appointment with id {}", appointment_id))?;

    // Span the current and the target week, on the technician's calendar.
    let range = weeks_spanning(appointment.start.date_naive(), date)
        .ok_or_else(|| anyhow!("No weeks span {} to {}", appointment.start.date_naive(), date))?;
    let technician = appointment.technician_id.clone();
    let mut controller = open_view(store, settings, range, technician).await?;

    controller.pick_up(appointment_id)?;
    match controller.drop_on(date, hour, Local::now()) {
        DropOutcome::Proposed(_) => {}
        DropOutcome::Rejected(err) => return Err(err.into()),
        _ => {
            println!("Nothing to do");
            return Ok(());
        }
    }

    let report = controller.commit_all(store).await?;
    for feedback in controller.feedback_mut().drain() {
        println!("{} {}", feedback.level.icon(), feedback.message);
    }
    match report.error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn print_grid(grid: &ProjectedGrid) {
    for date in &grid.days {
        println!("{}", date.format("%A %Y-%m-%d"));
        for cell in grid.day(*date) {
            if !cell.bookable {
                println!("  {:02}:00  -- lunch --", cell.slot.hour);
                continue;
            }
            let names: Vec<String> = cell
                .appointments
                .iter()
                .map(|item| {
                    let label = item
                        .appointment
                        .details
                        .client_name
                        .clone()
                        .unwrap_or_else(|| item.appointment.id.clone());
                    format!("{} [{}]", label, item.appointment.status.label())
                })
                .collect();
            println!("  {:02}:00  {}", cell.slot.hour, names.join(", "));
        }
    }
}
