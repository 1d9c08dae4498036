//! quotify-gui: the quote screen as an egui window.
//!
//! Shares the session controller with the terminal front-end. Fetch tasks
//! run on a tokio runtime entered for the lifetime of the window; their
//! outcomes are drained at the start of every frame. Speech and audio
//! focus are released when the app (and its controller) is dropped.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clap::Parser;
use eframe::egui;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quotify::client::QuoteClient;
use quotify::config::Config;
use quotify::platform::{NotificationService, Platform};
use quotify::quote::Quote;
use quotify::session::{Control, FetchOutcomes, Pulse, SessionController, SessionView};

const TOAST_TTL: Duration = Duration::from_millis(2000);
const REPAINT_INTERVAL: Duration = Duration::from_millis(50);
const HIGHLIGHT: egui::Color32 = egui::Color32::from_rgb(255, 193, 7);

#[derive(Parser, Debug)]
#[command(name = "quotify-gui", about = "Random quote window")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

/// What the window shows; written by the controller through `SessionView`.
#[derive(Default)]
struct ScreenState {
    quote: Option<Quote>,
    loading: bool,
    copy_pulse: Option<(Instant, Pulse)>,
}

impl ScreenState {
    fn expire_pulse(&mut self, now: Instant) {
        if let Some((started, pulse)) = self.copy_pulse {
            if now.duration_since(started) >= pulse.reset_after {
                self.copy_pulse = None;
            }
        }
    }

    /// Copy button fill: transparent → highlight over the pulse duration.
    fn copy_fill(&self, now: Instant) -> egui::Color32 {
        let Some((started, pulse)) = self.copy_pulse else {
            return egui::Color32::TRANSPARENT;
        };
        let t = (now.duration_since(started).as_secs_f32() / pulse.duration.as_secs_f32()).min(1.0);
        egui::Color32::from_rgba_unmultiplied(HIGHLIGHT.r(), HIGHLIGHT.g(), HIGHLIGHT.b(), (t * 255.0) as u8)
    }
}

impl SessionView for ScreenState {
    fn show_quote(&mut self, quote: &Quote) {
        self.quote = Some(quote.clone());
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn pulse(&mut self, control: Control, pulse: Pulse) {
        if control == Control::Copy {
            self.copy_pulse = Some((Instant::now(), pulse));
        }
    }
}

struct Toast {
    message: String,
    shown: Instant,
}

type Toasts = Arc<Mutex<VecDeque<Toast>>>;

struct ToastNotifier {
    toasts: Toasts,
}

impl NotificationService for ToastNotifier {
    fn notify(&self, message: &str) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push_back(Toast {
                message: message.to_string(),
                shown: Instant::now(),
            });
        }
    }
}

struct QuotifyApp {
    controller: SessionController<ScreenState>,
    outcomes: FetchOutcomes,
    toasts: Toasts,
}

impl QuotifyApp {
    fn dispatch(&mut self, control: Control) {
        let controller = &mut self.controller;
        match control {
            Control::Next => controller.request_next(),
            Control::Speak => controller.speak_current(),
            Control::Copy => controller.copy_current(),
            Control::Share => controller.share_current(),
        }
    }
}

impl eframe::App for QuotifyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.controller.on_fetch_complete(outcome);
        }

        let now = Instant::now();
        self.controller.view_mut().expire_pulse(now);

        let mut clicked = None;
        let state = self.controller.view();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                match &state.quote {
                    Some(quote) => {
                        ui.heading(format!("\u{201c}{}\u{201d}", quote.text));
                        ui.add_space(8.0);
                        ui.label(format!("\u{2014} {}", quote.author));
                    }
                    None => {
                        ui.label("No quote yet");
                    }
                }
                ui.add_space(24.0);
                ui.horizontal(|ui| {
                    if state.loading {
                        ui.spinner();
                    } else if ui.button("Next").clicked() {
                        clicked = Some(Control::Next);
                    }
                    if ui.button("Speak").clicked() {
                        clicked = Some(Control::Speak);
                    }
                    if ui
                        .add(egui::Button::new("Copy").fill(state.copy_fill(now)))
                        .clicked()
                    {
                        clicked = Some(Control::Copy);
                    }
                    if ui.button("Share").clicked() {
                        clicked = Some(Control::Share);
                    }
                });
            });
        });

        let pulsing = state.copy_pulse.is_some();
        let loading = state.loading;
        if let Some(control) = clicked {
            self.dispatch(control);
        }

        let mut toasts = match self.toasts.lock() {
            Ok(t) => t,
            Err(poisoned) => poisoned.into_inner(),
        };
        toasts.retain(|t| now.duration_since(t.shown) < TOAST_TTL);
        if !toasts.is_empty() {
            egui::Area::new(egui::Id::new("toasts"))
                .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
                .show(ctx, |ui| {
                    for toast in toasts.iter() {
                        egui::Frame::popup(&ctx.style()).show(ui, |ui| {
                            ui.label(&toast.message);
                        });
                    }
                });
        }

        if loading || pulsing || !toasts.is_empty() {
            ctx.request_repaint_after(REPAINT_INTERVAL);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug,reqwest=info,hyper=info,hyper_util=info,eframe=info,egui_glow=info")
    } else {
        EnvFilter::new("warn,quotify=info,quotify_gui=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(args.config.as_deref());

    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let source = Arc::new(QuoteClient::new(&config.api)?);
    info!("Quote endpoint: {}", source.endpoint());

    let toasts: Toasts = Arc::new(Mutex::new(VecDeque::new()));
    let platform = Platform::desktop_with_notifier(
        &config,
        Arc::new(ToastNotifier {
            toasts: toasts.clone(),
        }),
    );

    let (mut controller, outcomes) =
        SessionController::new(source, platform, ScreenState::default(), config.speech.clone());
    controller.request_next();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Quotify")
            .with_inner_size([480.0, 320.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Quotify",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(QuotifyApp {
                controller,
                outcomes,
                toasts,
            }))
        }),
    )?;

    Ok(())
}
