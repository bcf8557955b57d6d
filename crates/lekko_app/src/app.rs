use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use egui::{Color32, RichText};
use lekko_core::{
    calendar, ops, progress,
    weight::{self, Milestone, MilestoneKind},
    TrackerDocument, TrackerService,
};
use tracing::{info, warn};

const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const ACCENT: Color32 = Color32::from_rgb(16, 150, 105);

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_path: PathBuf,
    /// Auto milestone bands stop at this weight.
    pub band_floor_kg: f64,
    pub band_step_kg: f64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("LEKKO_DATA_FILE") {
            if !path.trim().is_empty() {
                config.data_path = PathBuf::from(path);
            }
        }
        if let Ok(floor) = std::env::var("LEKKO_BAND_FLOOR_KG") {
            if let Ok(value) = floor.trim().parse::<f64>() {
                if value > 0.0 {
                    config.band_floor_kg = value;
                }
            }
        }
        if let Ok(step) = std::env::var("LEKKO_BAND_STEP_KG") {
            if let Ok(value) = step.trim().parse::<f64>() {
                if value > 0.0 {
                    config.band_step_kg = value;
                }
            }
        }
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            band_floor_kg: 90.0,
            band_step_kg: 2.0,
        }
    }
}

fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lekko")
        .join("tracker.json")
}

pub fn run(config: AppConfig) -> Result<()> {
    info!(path = %config.data_path.display(), "starting Lekko");
    let mut service = TrackerService::builder()
        .with_data_path(&config.data_path)
        .build()?;
    if let Err(err) = service.watch() {
        warn!(%err, "file watcher unavailable");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([460.0, 780.0])
            .with_title("Lekko"),
        ..Default::default()
    };
    let app = TrackerApp::new(service, config);
    eframe::run_native("Lekko", options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|err| anyhow::anyhow!("event loop terminated: {err}"))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tab {
    Dashboard,
    Habits,
    Weight,
}

pub struct TrackerApp {
    service: TrackerService,
    config: AppConfig,
    tab: Tab,
    status: String,
    week_offset: i64,
    new_habit_name: String,
    new_habit_days: BTreeSet<u8>,
    new_skip_date: String,
    log_date: String,
    log_weight: String,
    new_milestone_label: String,
    new_milestone_target: String,
}

impl TrackerApp {
    pub fn new(service: TrackerService, config: AppConfig) -> Self {
        Self {
            service,
            config,
            tab: Tab::Dashboard,
            status: String::new(),
            week_offset: 0,
            new_habit_name: String::new(),
            new_habit_days: (0..7).collect(),
            new_skip_date: String::new(),
            log_date: calendar::today().to_string(),
            log_weight: String::new(),
            new_milestone_label: String::new(),
            new_milestone_target: String::new(),
        }
    }

    fn apply<F>(&mut self, action: &str, mutate: F)
    where
        F: FnOnce(TrackerDocument) -> TrackerDocument,
    {
        match self.service.apply(mutate) {
            Ok(()) => self.status = format!("Saved ({action})"),
            Err(err) => {
                warn!(%err, action, "mutation not persisted");
                self.status = format!("Save failed: {err}");
            }
        }
    }

    /// Bands run from the current weight (rounded up to the next step
    /// multiple) down to the configured floor. Regenerated on every read, so
    /// they can never go stale against the latest log.
    fn auto_bands(&self, current: Option<f64>) -> Vec<Milestone> {
        match current {
            Some(kg) => {
                let step = self.config.band_step_kg;
                let start = (kg / step).ceil() * step;
                weight::generate_milestone_bands(start, self.config.band_floor_kg, step)
            }
            None => Vec::new(),
        }
    }

    fn weight_summary(&self, ui: &mut egui::Ui, doc: &TrackerDocument) {
        match weight::latest_weight(&doc.weight_logs) {
            Some(latest) => {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(format!("{} kg", latest.weight_kg)).heading());
                    ui.label(
                        RichText::new(calendar::format_short_date(latest.date)).weak(),
                    );
                });
                if let Some(change) = weight::weight_change(&doc.weight_logs) {
                    let text = if change.diff < 0.0 {
                        format!("{:.1} kg down from previous", change.diff.abs())
                    } else if change.diff > 0.0 {
                        format!("+{:.1} kg from previous", change.diff)
                    } else {
                        "No change from previous".to_string()
                    };
                    let color = if change.diff <= 0.0 {
                        ACCENT
                    } else {
                        ui.visuals().weak_text_color()
                    };
                    ui.label(RichText::new(text).color(color));
                }
            }
            None => {
                ui.label(RichText::new("No logs yet. Add one on the Weight tab.").weak());
            }
        }
    }

    fn milestone_row(&self, ui: &mut egui::Ui, milestone: &Milestone, current: Option<f64>) {
        ui.horizontal(|ui| {
            ui.label(&milestone.label);
            if let Some(current) = current {
                let to_go = weight::kg_to_go(current, milestone.target_kg);
                if to_go == 0.0 {
                    ui.label(RichText::new("Achieved").color(ACCENT).strong());
                } else {
                    ui.label(RichText::new(format!("{to_go} kg to go")).weak());
                }
            }
        });
    }

    fn dashboard_tab(&mut self, ui: &mut egui::Ui) {
        let doc = self.service.document();
        let today = calendar::today();

        ui.heading("Today");
        ui.label(RichText::new(calendar::format_short_date(today)).weak());
        ui.add_space(4.0);
        let live: Vec<_> = doc.habits.iter().filter(|h| !h.discontinued).collect();
        if live.is_empty() {
            ui.label(RichText::new("Add habits on the Habits tab.").weak());
        } else {
            ui.horizontal_wrapped(|ui| {
                for habit in &live {
                    let checked = doc.is_checked(today, &habit.id);
                    if ui.selectable_label(checked, &habit.name).clicked() {
                        let id = habit.id.clone();
                        self.apply("check", move |doc| ops::toggle_check(doc, today, &id));
                    }
                }
            });
        }

        ui.separator();
        ui.heading("Weight");
        self.weight_summary(ui, &doc);

        ui.separator();
        ui.heading("This week so far");
        let week = calendar::week_dates(today);
        let totals = progress::week_totals(&doc, &week, today);
        ui.label(
            RichText::new(format!("{} / {} checks", totals.actual, totals.possible)).strong(),
        );
        match progress::completion_percent(&totals) {
            Some(percent) => {
                ui.label(RichText::new(format!("{percent}% of possible so far")).weak());
            }
            None => {
                ui.label(RichText::new("Nothing scheduled yet this week.").weak());
            }
        }

        ui.separator();
        ui.heading("Next milestones");
        let current = weight::latest_weight(&doc.weight_logs).map(|log| log.weight_kg);
        let merged = weight::merge_milestones(&doc.milestones, &self.auto_bands(current));
        let next = weight::next_milestones(current, &merged, 3);
        if next.is_empty() {
            let hint = if current.is_some() {
                "You've reached the lowest target, or add more milestones."
            } else {
                "Log weight to see milestones."
            };
            ui.label(RichText::new(hint).weak());
        } else {
            for milestone in &next {
                self.milestone_row(ui, milestone, current);
            }
        }

        let streaks = progress::top_streaks(&doc, today, 3);
        if !streaks.is_empty() {
            ui.separator();
            ui.heading("Streaks");
            for (habit, days) in &streaks {
                ui.horizontal(|ui| {
                    ui.label(&habit.name);
                    let unit = if *days == 1 { "day" } else { "days" };
                    ui.label(RichText::new(format!("{days} {unit}")).color(ACCENT).strong());
                });
            }
        }

        ui.separator();
        self.data_section(ui);
    }

    fn data_section(&mut self, ui: &mut egui::Ui) {
        ui.collapsing("Data file", |ui| {
            ui.label(RichText::new(self.service.data_path().display().to_string()).weak());
            ui.horizontal(|ui| {
                if ui.button("Reload from disk").clicked() {
                    self.service.reload();
                    self.status = "Reloaded".to_string();
                }
                #[cfg(not(any(target_os = "android", target_os = "ios")))]
                {
                    if ui.button("Choose data file…").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .pick_file()
                        {
                            self.switch_data_file(path);
                        }
                    }
                }
            });
        });
    }

    fn switch_data_file(&mut self, path: PathBuf) {
        match TrackerService::builder().with_data_path(&path).build() {
            Ok(mut service) => {
                if let Err(err) = service.watch() {
                    warn!(%err, "file watcher unavailable");
                }
                self.service = service;
                self.status = format!("Using {}", path.display());
            }
            Err(err) => {
                warn!(%err, path = %path.display(), "could not open data file");
                self.status = format!("Could not open {}: {err}", path.display());
            }
        }
    }

    fn habits_tab(&mut self, ui: &mut egui::Ui) {
        let doc = self.service.document();
        let today = calendar::today();
        let ref_date = today + Duration::days(self.week_offset * 7);
        let week = calendar::week_dates(ref_date);

        ui.horizontal(|ui| {
            if ui.button("← Prev").clicked() {
                self.week_offset -= 1;
            }
            ui.label(
                RichText::new(format!(
                    "{} – {}",
                    calendar::format_short_date(week[0]),
                    calendar::format_short_date(week[6])
                ))
                .strong(),
            );
            if ui.button("Next →").clicked() {
                self.week_offset += 1;
            }
            if self.week_offset != 0 && ui.button("This week").clicked() {
                self.week_offset = 0;
            }
        });
        ui.add_space(6.0);

        let live: Vec<_> = doc
            .habits
            .iter()
            .filter(|h| !h.discontinued)
            .cloned()
            .collect();
        if live.is_empty() {
            ui.label(RichText::new("No habits yet – add one below.").weak());
        } else {
            egui::Grid::new("week_grid").striped(true).show(ui, |ui| {
                ui.label(RichText::new("Habit").weak());
                for &date in &week {
                    ui.vertical(|ui| {
                        ui.label(RichText::new(calendar::format_short_day(date)).weak());
                        ui.label(
                            RichText::new(calendar::format_short_date(date)).weak().small(),
                        );
                    });
                }
                ui.end_row();

                for habit in &live {
                    let (done, possible) = progress::habit_week_completion(
                        habit,
                        &week,
                        &doc.habit_checks,
                        &doc.skip_dates,
                    );
                    ui.vertical(|ui| {
                        ui.label(&habit.name);
                        ui.label(RichText::new(format!("{done}/{possible}")).weak().small());
                    });
                    for &date in &week {
                        if habit.is_scheduled_on(date, &doc.skip_dates) {
                            let checked = doc.is_checked(date, &habit.id);
                            let mark = if checked { "✓" } else { "·" };
                            if ui.selectable_label(checked, mark).clicked() {
                                let id = habit.id.clone();
                                self.apply("check", move |doc| {
                                    ops::toggle_check(doc, date, &id)
                                });
                            }
                        } else {
                            ui.label(RichText::new("—").weak());
                        }
                    }
                    ui.end_row();
                }

                // Checks landed per day, skip days pinned to zero.
                let totals = progress::week_totals(&doc, &week, today);
                ui.label(RichText::new("Checks").weak());
                for count in &totals.per_day {
                    ui.label(RichText::new(count.to_string()).weak());
                }
                ui.end_row();
            });

            ui.add_space(4.0);
            ui.horizontal(|ui| {
                for habit in &live {
                    let days = progress::streak(&doc.habit_checks, &habit.id, today);
                    if days > 0 {
                        ui.label(
                            RichText::new(format!("{}: {} day streak", habit.name, days))
                                .weak()
                                .small(),
                        );
                    }
                }
            });
        }

        let discontinued: Vec<_> = doc
            .habits
            .iter()
            .filter(|h| h.discontinued)
            .cloned()
            .collect();
        if !discontinued.is_empty() {
            ui.separator();
            ui.heading("Discontinued habits");
            ui.label(RichText::new("Stopped tracking these. Past data is kept.").weak());
            for habit in &discontinued {
                ui.horizontal(|ui| {
                    ui.label(&habit.name);
                    if ui.button("Reactivate").clicked() {
                        let id = habit.id.clone();
                        self.apply("reactivate", move |doc| {
                            ops::set_discontinued(doc, &id, false)
                        });
                    }
                    if ui.button("Delete").clicked() {
                        let id = habit.id.clone();
                        self.apply("delete habit", move |doc| ops::delete_habit(doc, &id));
                    }
                });
            }
        }

        if !live.is_empty() {
            ui.separator();
            ui.heading("Manage");
            for habit in &live {
                ui.horizontal(|ui| {
                    ui.label(&habit.name);
                    if ui.button("Discontinue").clicked() {
                        let id = habit.id.clone();
                        self.apply("discontinue", move |doc| {
                            ops::set_discontinued(doc, &id, true)
                        });
                    }
                    if ui.button("Delete").clicked() {
                        let id = habit.id.clone();
                        self.apply("delete habit", move |doc| ops::delete_habit(doc, &id));
                    }
                });
            }
        }

        ui.separator();
        ui.heading("Add habit");
        ui.horizontal(|ui| {
            ui.label("Name");
            ui.add(
                egui::TextEdit::singleline(&mut self.new_habit_name)
                    .hint_text("e.g. No alcohol")
                    .desired_width(180.0),
            );
        });
        ui.label(RichText::new("Active days (unselected days show as skip)").weak());
        ui.horizontal(|ui| {
            for (index, label) in DAY_LABELS.iter().enumerate() {
                let day = index as u8;
                let on = self.new_habit_days.contains(&day);
                if ui.selectable_label(on, *label).clicked() {
                    if on {
                        self.new_habit_days.remove(&day);
                    } else {
                        self.new_habit_days.insert(day);
                    }
                }
            }
        });
        if ui.button("Add habit").clicked() && !self.new_habit_name.trim().is_empty() {
            let name = self.new_habit_name.trim().to_string();
            let days = self.new_habit_days.clone();
            self.apply("add habit", move |doc| {
                ops::add_habit(doc, &name, Some(days))
            });
            self.new_habit_name.clear();
            self.new_habit_days = (0..7).collect();
        }

        ui.separator();
        ui.heading("Skip days");
        ui.label(
            RichText::new(
                "A date when you're not tracking (holiday, celebration). \
                 All habits show as skip for that day.",
            )
            .weak(),
        );
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.new_skip_date)
                    .hint_text("YYYY-MM-DD")
                    .desired_width(110.0),
            );
            if ui.button("Add skip day").clicked() {
                match NaiveDate::parse_from_str(self.new_skip_date.trim(), "%Y-%m-%d") {
                    Ok(date) => {
                        self.apply("add skip day", move |doc| ops::add_skip_date(doc, date));
                        self.new_skip_date.clear();
                    }
                    Err(_) => self.status = "Skip day must be YYYY-MM-DD".to_string(),
                }
            }
        });
        let skip_dates: Vec<NaiveDate> = doc
            .skip_dates
            .iter()
            .filter(|(_, &flag)| flag)
            .map(|(&date, _)| date)
            .collect();
        for date in skip_dates {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} ({})",
                    calendar::format_short_date(date),
                    calendar::format_short_day(date)
                ));
                if ui.small_button("Remove").clicked() {
                    self.apply("remove skip day", move |doc| {
                        ops::remove_skip_date(doc, date)
                    });
                }
            });
        }
    }

    fn weight_tab(&mut self, ui: &mut egui::Ui) {
        let doc = self.service.document();

        ui.heading("Log weight");
        ui.horizontal(|ui| {
            ui.label("Date");
            ui.add(
                egui::TextEdit::singleline(&mut self.log_date)
                    .hint_text("YYYY-MM-DD")
                    .desired_width(110.0),
            );
            ui.label("Weight (kg)");
            ui.add(
                egui::TextEdit::singleline(&mut self.log_weight)
                    .hint_text("e.g. 95.5")
                    .desired_width(70.0),
            );
            if ui.button("Add log").clicked() {
                let date = NaiveDate::parse_from_str(self.log_date.trim(), "%Y-%m-%d");
                let kg = self.log_weight.trim().parse::<f64>();
                match (date, kg) {
                    (Ok(date), Ok(kg)) if kg.is_finite() && kg > 0.0 => {
                        self.apply("log weight", move |doc| {
                            ops::add_weight_log(doc, date, kg)
                        });
                        self.log_weight.clear();
                        self.log_date = calendar::today().to_string();
                    }
                    _ => self.status = "Weight needs a date and a positive number".to_string(),
                }
            }
        });

        ui.separator();
        ui.heading("Current weight");
        self.weight_summary(ui, &doc);

        ui.separator();
        ui.heading("Recent logs");
        let mut sorted: Vec<_> = doc.weight_logs.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        if sorted.is_empty() {
            ui.label(RichText::new("No weight logs yet.").weak());
        } else {
            for log in sorted.into_iter().take(10) {
                ui.horizontal(|ui| {
                    ui.label(format!("{} — {} kg", log.date, log.weight_kg));
                    if ui.small_button("Delete").clicked() {
                        let id = log.id.clone();
                        self.apply("delete log", move |doc| ops::delete_weight_log(doc, &id));
                    }
                });
            }
        }

        let current = weight::latest_weight(&doc.weight_logs).map(|log| log.weight_kg);
        let merged = weight::merge_milestones(&doc.milestones, &self.auto_bands(current));

        ui.separator();
        ui.heading("Milestones");
        if merged.is_empty() {
            ui.label(RichText::new("No milestones defined.").weak());
        } else {
            for milestone in &merged {
                ui.horizontal(|ui| {
                    ui.label(&milestone.label);
                    if let Some(current) = current {
                        let to_go = weight::kg_to_go(current, milestone.target_kg);
                        if to_go == 0.0 {
                            ui.label(RichText::new("Achieved").color(ACCENT).strong());
                        } else {
                            ui.label(RichText::new(format!("{to_go} kg to go")).weak());
                        }
                    }
                    if milestone.kind == MilestoneKind::Custom
                        && ui.small_button("Delete").clicked()
                    {
                        let id = milestone.id.clone();
                        self.apply("delete milestone", move |doc| {
                            ops::delete_milestone(doc, &id)
                        });
                    }
                });
            }
        }

        ui.separator();
        ui.heading("Next auto targets");
        let next = weight::next_milestones(current, &merged, 5);
        if next.is_empty() {
            let hint = if current.is_some() {
                "No upcoming targets below the current weight."
            } else {
                "Log weight to see auto milestones."
            };
            ui.label(RichText::new(hint).weak());
        } else {
            for milestone in &next {
                self.milestone_row(ui, milestone, current);
            }
        }

        ui.separator();
        ui.heading("Add milestone");
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.new_milestone_label)
                    .hint_text("e.g. Fit into the old jacket")
                    .desired_width(180.0),
            );
            ui.add(
                egui::TextEdit::singleline(&mut self.new_milestone_target)
                    .hint_text("kg")
                    .desired_width(60.0),
            );
            if ui.button("Add").clicked() {
                match self.new_milestone_target.trim().parse::<f64>() {
                    Ok(target) if target.is_finite() && target > 0.0 => {
                        let label = self.new_milestone_label.trim().to_string();
                        if label.is_empty() {
                            self.status = "Milestone needs a label".to_string();
                        } else {
                            self.apply("add milestone", move |doc| {
                                ops::add_milestone(doc, &label, target)
                            });
                            self.new_milestone_label.clear();
                            self.new_milestone_target.clear();
                        }
                    }
                    _ => self.status = "Milestone target must be a positive number".to_string(),
                }
            }
        });
    }
}

impl eframe::App for TrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Dashboard, "Dashboard");
                ui.selectable_value(&mut self.tab, Tab::Habits, "Habits");
                ui.selectable_value(&mut self.tab, Tab::Weight, "Weight");
            });
        });
        if !self.status.is_empty() {
            let status = self.status.clone();
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                ui.label(RichText::new(status).weak());
            });
        }
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.tab {
                    Tab::Dashboard => self.dashboard_tab(ui),
                    Tab::Habits => self.habits_tab(ui),
                    Tab::Weight => self.weight_tab(ui),
                });
        });
    }
}
