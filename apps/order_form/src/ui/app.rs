use std::time::Duration;

use client_core::{ControllerEvent, RecordStore, SubmissionController};
use eframe::egui;
use shared::domain::{Record, Store, TrackingStatus};
use tokio::sync::broadcast::{error::TryRecvError, Receiver};

use crate::ui::banner::{status_banner, submit_label};

pub struct OrderFormApp {
    controller: SubmissionController,
    events: Receiver<ControllerEvent>,
    focus_first_field: bool,
}

impl OrderFormApp {
    pub fn new(controller: SubmissionController) -> Self {
        let events = controller.subscribe();
        Self {
            controller,
            events,
            focus_first_field: true,
        }
    }

    fn process_controller_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(ControllerEvent::FocusFirstField) => self.focus_first_field = true,
                Ok(ControllerEvent::StatusChanged(status)) => {
                    tracing::debug!(%status, "form observed status change");
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "form fell behind controller events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    fn field_label(ui: &mut egui::Ui, label: &str, required: bool) {
        let text = if required {
            format!("{label} *")
        } else {
            label.to_string()
        };
        ui.label(egui::RichText::new(text).strong());
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let store = self.controller.store().clone();
        let before = store.get();
        let mut draft = before.clone();

        Self::field_label(ui, "Order number", true);
        let order_response = ui.add(
            egui::TextEdit::singleline(&mut draft.order_number)
                .id_salt("order_number")
                .hint_text("e.g. ORD-1042")
                .desired_width(f32::INFINITY),
        );
        if std::mem::take(&mut self.focus_first_field) {
            order_response.request_focus();
        }
        ui.add_space(6.0);

        Self::field_label(ui, "Tracking status", true);
        egui::ComboBox::from_id_salt("tracking_status")
            .selected_text(draft.tracking_status.label())
            .show_ui(ui, |ui| {
                for option in TrackingStatus::SELECTABLE {
                    ui.selectable_value(&mut draft.tracking_status, option, option.label());
                }
            });
        ui.add_space(6.0);

        Self::field_label(ui, "Link", false);
        ui.add(
            egui::TextEdit::singleline(&mut draft.link)
                .id_salt("link")
                .hint_text("https://")
                .desired_width(f32::INFINITY),
        );
        ui.add_space(6.0);

        Self::field_label(ui, "Store", true);
        egui::ComboBox::from_id_salt("store")
            .selected_text(draft.store.label())
            .show_ui(ui, |ui| {
                for option in Store::SELECTABLE {
                    ui.selectable_value(&mut draft.store, option, option.label());
                }
            });
        ui.add_space(6.0);

        Self::field_label(ui, "Action", false);
        ui.add(
            egui::TextEdit::multiline(&mut draft.action)
                .id_salt("action")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );

        sync_draft(&store, &before, &draft);

        ui.add_space(10.0);
        let status = self.controller.status();
        let enter_pressed =
            order_response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let clicked = ui
            .add_enabled(
                !self.controller.is_submit_disabled(),
                egui::Button::new(submit_label(status)),
            )
            .clicked();
        if clicked || (enter_pressed && !self.controller.is_submit_disabled()) {
            let _ = self.controller.submit(store.get());
        }

        if let Some(banner) = status_banner(self.controller.status()) {
            ui.add_space(8.0);
            ui.colored_label(banner.color, banner.text);
        }
    }
}

/// Pushes only the fields the widgets changed this frame back into the session draft.
fn sync_draft(store: &RecordStore, before: &Record, draft: &Record) {
    if draft.order_number != before.order_number {
        store.set_order_number(draft.order_number.clone());
    }
    if draft.tracking_status != before.tracking_status {
        store.set_tracking_status(draft.tracking_status);
    }
    if draft.link != before.link {
        store.set_link(draft.link.clone());
    }
    if draft.store != before.store {
        store.set_store(draft.store);
    }
    if draft.action != before.action {
        store.set_action(draft.action.clone());
    }
}

impl eframe::App for OrderFormApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_controller_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Order return");
            ui.add_space(8.0);
            self.show_form(ui);
        });

        // Status resets happen off the UI thread.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

impl Drop for OrderFormApp {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}
