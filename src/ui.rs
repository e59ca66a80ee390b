use crate::{
    catalog::Catalog,
    config::{AppConfig, ScanConfig},
    loader::load_catalog,
    model::{Rarity, ScanHit, CURRENCY},
    report::write_report,
    scanner::scan,
    stats::{summarize, ScanSummary},
};
use eframe::egui;
use egui::{
    Color32, Context, Margin, RichText, Visuals, Stroke, Vec2
};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot};
use std::path::Path;
use tracing::{info, warn};

const ACCENT: Color32 = Color32::from_rgb(235, 75, 75);
const HEADER: Color32 = Color32::from_rgb(190, 200, 215);
const MUTED: Color32 = Color32::from_rgb(150, 160, 175);

pub fn set_custom_style(ctx: &Context) {
    let mut visuals = Visuals::dark();
    visuals.panel_fill = Color32::from_rgb(22, 25, 31);
    visuals.extreme_bg_color = Color32::from_rgb(34, 39, 48);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.5, ACCENT);
    visuals.selection.bg_fill = Color32::from_rgb(90, 45, 50);
    ctx.set_visuals(visuals);

    ctx.style_mut(|style| {
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        for (text_style, size) in [
            (egui::TextStyle::Body, 15.0),
            (egui::TextStyle::Button, 15.0),
            (egui::TextStyle::Heading, 20.0),
        ] {
            if let Some(font) = style.text_styles.get_mut(&text_style) {
                font.size = size;
            }
        }
    });
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SortBy {
    Roi,
    ExpectedValue,
    Cost,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SortOrder {
    Ascending,
    Descending,
}

pub struct TradeupApp {
    config: AppConfig,
    catalog: Option<Catalog>,
    hits: Vec<ScanHit>,
    filtered: Vec<ScanHit>,
    summary: ScanSummary,
    status: Option<String>,

    threshold: f64,
    /// Threshold the current `hits` were scanned with.
    scanned_threshold: f64,
    search: String,
    selected_rarity: Option<Rarity>,

    sort_by: SortBy,
    sort_order: SortOrder,

    selected_row: Option<usize>,
}

impl TradeupApp {
    pub fn new(config: AppConfig) -> Self {
        let threshold = config.scan.threshold;
        Self {
            config,
            catalog: None,
            hits: vec![],
            filtered: vec![],
            summary: ScanSummary::default(),
            status: None,

            threshold,
            scanned_threshold: threshold,
            search: String::new(),
            selected_rarity: None,

            sort_by: SortBy::Roi,
            sort_order: SortOrder::Descending,

            selected_row: None,
        }
    }

    fn load_and_scan(&mut self) {
        match load_catalog(&self.config.catalog.db_path) {
            Ok(catalog) => {
                self.catalog = Some(catalog);
                self.run_scan();
            }
            Err(e) => {
                warn!(error = %e, "catalog load failed");
                self.status = Some(format!("Could not load catalog: {e:#}"));
            }
        }
    }

    fn run_scan(&mut self) {
        let Some(catalog) = &self.catalog else {
            return;
        };

        let scan_config = ScanConfig {
            threshold: self.threshold,
            rarities: self.config.scan.rarities.clone(),
        };

        match scan(catalog, &scan_config) {
            Ok(hits) => {
                self.summary = summarize(&hits);
                self.status = Some(format!(
                    "{} catalog rows, {} trade-ups at or above {:.0}% ROI",
                    catalog.len(),
                    hits.len(),
                    self.threshold * 100.0
                ));
                self.hits = hits;
                self.scanned_threshold = self.threshold;
                self.selected_row = None;
                self.apply_filters();
            }
            Err(e) => {
                warn!(error = %e, "scan failed");
                self.status = Some(format!("Scan failed: {e}"));
            }
        }
    }

    fn export(&mut self) {
        let path = Path::new(&self.config.report.path);
        match write_report(path, &self.filtered) {
            Ok(()) => {
                info!(report = %path.display(), rows = self.filtered.len(), "report exported");
                self.status = Some(format!("Exported {} rows to {}", self.filtered.len(), path.display()));
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.status = Some(format!("Export failed: {e:#}"));
            }
        }
    }

    /// Raising the threshold only narrows the last scan; lowering it needs
    /// a rescan, which waits until the edit is committed.
    fn threshold_changed(&mut self) {
        if self.threshold >= self.scanned_threshold {
            self.apply_filters();
        }
    }

    fn threshold_committed(&mut self) {
        if self.threshold < self.scanned_threshold {
            self.run_scan();
        }
    }

    fn apply_filters(&mut self) {
        let mut filtered = self.hits.clone();

        let threshold = self.threshold;
        filtered.retain(|h| h.roi >= threshold);

        if let Some(rarity) = self.selected_rarity {
            filtered.retain(|h| h.input.rarity == rarity);
        }

        if !self.search.is_empty() {
            let search_lower = self.search.to_lowercase();
            filtered.retain(|h| {
                h.input.market_hash_name.to_lowercase().contains(&search_lower)
                    || h.input.collection.to_lowercase().contains(&search_lower)
            });
        }

        let descending = self.sort_order == SortOrder::Descending;
        filtered.sort_by(|a, b| {
            let ord = match self.sort_by {
                SortBy::Roi => a.roi.total_cmp(&b.roi),
                SortBy::ExpectedValue => a.expected_value.total_cmp(&b.expected_value),
                SortBy::Cost => a.cost.total_cmp(&b.cost),
                SortBy::Name => a.input.market_hash_name.cmp(&b.input.market_hash_name),
            };
            if descending { ord.reverse() } else { ord }
        });

        self.filtered = filtered;
        self.selected_row = None;
    }
}

fn roi_color(roi: f64) -> Color32 {
    if roi >= 1.5 {
        Color32::from_rgb(100, 255, 100)
    } else if roi >= 1.1 {
        Color32::from_rgb(150, 255, 150)
    } else if roi >= 1.0 {
        Color32::from_rgb(210, 255, 200)
    } else {
        Color32::from_rgb(255, 220, 130)
    }
}

fn rarity_color(rarity: Rarity) -> Color32 {
    match rarity {
        Rarity::Consumer => Color32::from_rgb(176, 195, 217),
        Rarity::Industrial => Color32::from_rgb(94, 152, 217),
        Rarity::MilSpec => Color32::from_rgb(75, 105, 255),
        Rarity::Restricted => Color32::from_rgb(136, 71, 255),
        Rarity::Classified => Color32::from_rgb(211, 44, 230),
        Rarity::Covert => Color32::from_rgb(235, 75, 75),
    }
}

fn money(value: f64) -> String {
    format!("{CURRENCY}{value:.2}")
}

impl eframe::App for TradeupApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                ui.heading(RichText::new("Trade-Up Analyzer")
                    .color(ACCENT)
                    .strong()
                    .size(24.0)
                );
                if self.summary.hits > 0 {
                    ui.separator();
                    ui.label(RichText::new(format!(
                        "best {:.1}% | median {:.1}% | mean {:.1}% ± {:.1}",
                        self.summary.best_roi * 100.0,
                        self.summary.q50 * 100.0,
                        self.summary.mean_roi * 100.0,
                        self.summary.std_dev_roi * 100.0,
                    )).color(MUTED));
                }
            });

            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                if ui.add_sized(
                    Vec2::new(130.0, 32.0),
                    egui::Button::new(RichText::new("🔍 Scan Catalog")
                        .color(Color32::WHITE)
                        .strong())
                ).clicked() {
                    self.load_and_scan();
                }

                ui.separator();

                ui.label(RichText::new("Min ROI:").color(HEADER));
                let mut pct = self.threshold * 100.0;
                let response = ui.add(egui::DragValue::new(&mut pct)
                    .suffix(" %")
                    .speed(1.0)
                    .range(0.0..=1000.0));
                if response.changed() {
                    self.threshold = pct / 100.0;
                    self.threshold_changed();
                }
                if response.drag_stopped() || response.lost_focus() {
                    self.threshold_committed();
                }

                ui.separator();

                ui.label(RichText::new("🔎").color(HEADER));
                let search_response = ui.add(
                    egui::TextEdit::singleline(&mut self.search)
                        .hint_text("Skin or collection...")
                        .desired_width(220.0)
                );
                if search_response.changed() {
                    self.apply_filters();
                }

                ui.separator();

                if ui.add_enabled(!self.filtered.is_empty(), egui::Button::new("💾 Export report"))
                    .clicked()
                {
                    self.export();
                }
            });

            if let Some(status) = &self.status {
                ui.label(RichText::new(status).color(MUTED).small());
            }

            ui.add_space(2.0);
        });

        if self.catalog.is_some() {
            egui::SidePanel::right("filters")
                .min_width(230.0)
                .max_width(320.0)
                .show(ctx, |ui| {
                    ui.heading(RichText::new("Filters").color(ACCENT));
                    ui.separator();

                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.label(RichText::new("Input rarity").strong());
                        ui.horizontal_wrapped(|ui| {
                            for rarity in self.config.scan.rarities.clone() {
                                let is_selected = self.selected_rarity == Some(rarity);
                                let count = self.summary.by_rarity.iter()
                                    .find(|(r, _)| *r == rarity)
                                    .map_or(0, |(_, n)| *n);
                                if ui.selectable_label(
                                    is_selected,
                                    RichText::new(format!("{rarity} ({count})")).color(rarity_color(rarity))
                                ).clicked() {
                                    self.selected_rarity = if is_selected { None } else { Some(rarity) };
                                    self.apply_filters();
                                }
                            }
                        });

                        ui.add_space(10.0);
                        ui.separator();

                        ui.label(RichText::new("📊 Sort By").strong());
                        egui::ComboBox::from_id_salt("sort_by")
                            .selected_text(format!("{:?}", self.sort_by))
                            .show_ui(ui, |ui| {
                                for sort in [SortBy::Roi, SortBy::ExpectedValue, SortBy::Cost, SortBy::Name] {
                                    if ui.selectable_value(&mut self.sort_by, sort, format!("{:?}", sort)).clicked() {
                                        self.apply_filters();
                                    }
                                }
                            });

                        ui.horizontal(|ui| {
                            if ui.selectable_value(&mut self.sort_order, SortOrder::Descending, "⬇ Desc")
                                .clicked()
                            {
                                self.apply_filters();
                            }
                            if ui.selectable_value(&mut self.sort_order, SortOrder::Ascending, "⬆ Asc")
                                .clicked()
                            {
                                self.apply_filters();
                            }
                        });

                        ui.add_space(10.0);
                        ui.separator();

                        if ui.button(RichText::new("🔄 Reset Filters").color(Color32::from_rgb(255, 150, 150)))
                            .clicked()
                        {
                            self.search.clear();
                            self.selected_rarity = None;
                            self.sort_by = SortBy::Roi;
                            self.sort_order = SortOrder::Descending;
                            self.apply_filters();
                        }
                    });
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.catalog.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(100.0);
                        ui.label(RichText::new("Trade-Up Analyzer")
                            .size(28.0)
                            .color(HEADER));
                        ui.add_space(10.0);
                        ui.label(RichText::new(format!(
                            "Click 'Scan Catalog' to evaluate every uniform trade-up in {}",
                            self.config.catalog.db_path
                        )).color(MUTED));
                    });
                });
                return;
            }

            if self.filtered.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No trade-ups match the current threshold and filters")
                        .size(20.0)
                        .color(MUTED));
                });
                return;
            }

            let mut clicked_row = None;

            TableBuilder::new(ui)
                .striped(true)
                .vscroll(true)
                .max_scroll_height(420.0)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::remainder().at_least(220.0).clip(true)) // Input
                .column(Column::exact(110.0))  // Rarity
                .column(Column::initial(200.0).clip(true)) // Collection
                .column(Column::exact(70.0))   // Float
                .column(Column::exact(100.0))  // Cost
                .column(Column::exact(100.0))  // EV
                .column(Column::exact(90.0))   // ROI
                .column(Column::exact(50.0))   // Copy
                .header(30.0, |mut header| {
                    for title in ["Input Skin", "Rarity", "Collection", "Float", "Cost (10x)", "Exp. Value", "ROI", "📋"] {
                        header.col(|ui| {
                            ui.heading(RichText::new(title).color(HEADER));
                        });
                    }
                })
                .body(|body| {
                    body.rows(32.0, self.filtered.len(), |mut row| {
                        let i = row.index();
                        let h = &self.filtered[i];
                        let is_selected = self.selected_row == Some(i);

                        row.col(|ui| {
                            let mut text = RichText::new(&h.input.market_hash_name);
                            if is_selected {
                                text = text.color(ACCENT).strong();
                            }
                            if ui.selectable_label(is_selected, text).clicked() {
                                clicked_row = Some(i);
                            }
                        });

                        row.col(|ui| {
                            ui.label(RichText::new(h.input.rarity.as_str())
                                .color(rarity_color(h.input.rarity)));
                        });

                        row.col(|ui| {
                            ui.label(RichText::new(&h.input.collection).color(MUTED));
                        });

                        row.col(|ui| {
                            ui.label(format!("{:.3}", h.input.wear_float));
                        });

                        row.col(|ui| {
                            ui.label(RichText::new(money(h.cost))
                                .color(Color32::from_rgb(255, 150, 150)));
                        });

                        row.col(|ui| {
                            ui.label(RichText::new(money(h.expected_value))
                                .color(Color32::from_rgb(150, 255, 150)));
                        });

                        row.col(|ui| {
                            ui.label(RichText::new(format!("{:.1}%", h.roi * 100.0))
                                .color(roi_color(h.roi))
                                .strong());
                        });

                        row.col(|ui| {
                            if ui.button("📋").on_hover_text("Copy trade-up details").clicked() {
                                let copy_text = format!(
                                    "{}\nCost: {}\nExpected value: {}\nROI: {:.2}%\nOutcomes: {}",
                                    h.inputs_description(),
                                    money(h.cost),
                                    money(h.expected_value),
                                    h.roi * 100.0,
                                    h.breakdown_text(),
                                );
                                ui.ctx().copy_text(copy_text);
                            }
                        });
                    });
                });

            if let Some(i) = clicked_row {
                self.selected_row = if self.selected_row == Some(i) { None } else { Some(i) };
            }

            if let Some(h) = self.selected_row.and_then(|i| self.filtered.get(i)) {
                ui.add_space(10.0);
                ui.separator();

                egui::Frame::new()
                    .fill(Color32::from_rgb(30, 34, 42))
                    .stroke(Stroke::new(2.0, Color32::from_rgb(70, 60, 70)))
                    .inner_margin(Margin::same(12))
                    .show(ui, |ui| {
                        ui.label(RichText::new(h.inputs_description())
                            .color(ACCENT)
                            .strong()
                            .size(16.0));
                        ui.add_space(6.0);

                        for line in &h.breakdown {
                            ui.label(RichText::new(line.to_string()).monospace());
                        }
                        if h.breakdown.is_empty() {
                            ui.label(RichText::new("No priced outcomes").color(MUTED).italics());
                        }

                        let bars: Vec<Bar> = h.breakdown.iter()
                            .enumerate()
                            .map(|(i, line)| {
                                Bar::new(i as f64, line.probability * 100.0)
                                    .name(&line.market_hash_name)
                            })
                            .collect();

                        Plot::new("outcome_probabilities")
                            .height(160.0)
                            .allow_drag(false)
                            .allow_zoom(false)
                            .allow_scroll(false)
                            .show(ui, |plot_ui| {
                                plot_ui.bar_chart(BarChart::new("Probability %", bars).color(ACCENT));
                            });
                    });
            }
        });
    }
}
