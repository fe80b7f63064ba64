/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;

/// Selectable color theme.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum ThemeName {
    /// Nord: an arctic, north-bluish color palette.
    #[default]
    Nord,
    /// doom-nord-light: desaturated Nord accents for light backgrounds.
    DoomNordLight,
}

impl std::fmt::Display for ThemeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeName::Nord => write!(f, "nord"),
            ThemeName::DoomNordLight => write!(f, "doom-nord-light"),
        }
    }
}

/// Command-line arguments for the console.
#[derive(Debug, Parser)]
#[command(name = "console-tui", about = "Terminal console for cluster workloads")]
pub(crate) struct Args {
    /// API server address, e.g. the one `kubectl proxy` prints
    #[arg(long, short, env = "CONSOLE_ADDR", default_value = "http://127.0.0.1:8001")]
    pub(crate) addr: String,

    /// Namespace to list (all namespaces when omitted)
    #[arg(long, short, env = "CONSOLE_NAMESPACE")]
    pub(crate) namespace: Option<String>,

    /// Initial resource kind (deployments, replicasets, pods)
    #[arg(long, short, default_value = "deployments")]
    pub(crate) kind: String,

    /// Refresh interval in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub(crate) refresh_ms: u64,

    /// Refuse every action that mutates the cluster
    #[arg(long, env = "CONSOLE_READ_ONLY")]
    pub(crate) read_only: bool,

    /// PEM CA bundle used to verify the API server
    #[arg(long)]
    pub(crate) tls_ca: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, env = "CONSOLE_TOKEN", hide_env_values = true)]
    pub(crate) token: Option<String>,

    /// Color theme
    #[arg(long, default_value_t = ThemeName::Nord, value_enum)]
    pub(crate) theme: ThemeName,

    /// Log file (defaults to console_tui.log in the temp dir)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

impl Args {
    pub(crate) fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("console_tui.log"))
    }
}

/// All user-visible chrome text in the TUI.
pub(crate) struct Labels {
    pub(crate) app_name: &'static str,
    pub(crate) separator: &'static str,
    pub(crate) selection_caret: &'static str,
    pub(crate) refresh_icon: &'static str,
    pub(crate) no_selection: &'static str,
    pub(crate) all_namespaces: &'static str,
    pub(crate) read_only: &'static str,
    pub(crate) loading: &'static str,
    pub(crate) empty: &'static str,
    pub(crate) phase_awaiting: &'static str,
    pub(crate) phase_mutating: &'static str,
    pub(crate) global_help: &'static str,
}

impl Labels {
    pub(crate) fn en() -> Self {
        Self {
            app_name: "console",
            separator: " • ",
            selection_caret: "▸ ",
            refresh_icon: "⟳ ",
            no_selection: "No selection",
            all_namespaces: "all",
            read_only: "read-only",
            loading: "Loading...",
            empty: "No resources",
            phase_awaiting: "awaiting confirmation",
            phase_mutating: "working",
            global_help: "q: quit | esc: back",
        }
    }
}

/// Color scheme for the TUI.
///
/// Each field is a semantic role; themes assign concrete colors.
pub(crate) struct ColorScheme {
    // UI chrome
    pub(crate) app_name: Style,
    pub(crate) border: Style,
    pub(crate) border_focused: Style,
    pub(crate) footer_help: Style,

    // Table
    pub(crate) header_row: Style,
    pub(crate) row: Style,
    pub(crate) row_selected: Style,

    // Semantic states
    pub(crate) error: Style,
    pub(crate) info: Style,
    pub(crate) warn: Style,

    // Header stats
    pub(crate) stat_timing: Style,
    pub(crate) stat_selection: Style,
    pub(crate) stat_system: Style,
    pub(crate) stat_url: Style,
    pub(crate) stat_label: Style,

    // Dialog
    pub(crate) button: Style,
    pub(crate) button_focused: Style,
    pub(crate) hint_key: Style,
}

impl ColorScheme {
    /// Nord color scheme (https://www.nordtheme.com/).
    pub(crate) fn nord() -> Self {
        // Polar Night
        let polar1 = Color::Rgb(59, 66, 82); // #3B4252
        let polar3 = Color::Rgb(76, 86, 106); // #4C566A
        // Snow Storm
        let snow0 = Color::Rgb(216, 222, 233); // #D8DEE9
        let snow2 = Color::Rgb(236, 239, 244); // #ECEFF4
        // Frost
        let frost_cyan = Color::Rgb(136, 192, 208); // #88C0D0
        let frost_blue = Color::Rgb(129, 161, 193); // #81A1C1
        let frost_dark = Color::Rgb(94, 129, 172); // #5E81AC
        // Aurora
        let aurora_red = Color::Rgb(191, 97, 106); // #BF616A
        let aurora_orange = Color::Rgb(208, 135, 112); // #D08770
        let aurora_yellow = Color::Rgb(235, 203, 139); // #EBCB8B
        let aurora_purple = Color::Rgb(180, 142, 173); // #B48EAD

        Self {
            app_name: Style::default().fg(frost_cyan).add_modifier(Modifier::BOLD),
            border: Style::default().fg(polar3),
            border_focused: Style::default().fg(aurora_orange),
            footer_help: Style::default().fg(polar3),

            header_row: Style::default().fg(frost_blue).add_modifier(Modifier::BOLD),
            row: Style::default().fg(snow0),
            row_selected: Style::default()
                .fg(aurora_purple)
                .add_modifier(Modifier::BOLD),

            error: Style::default().fg(aurora_red),
            info: Style::default().fg(frost_cyan),
            warn: Style::default().fg(aurora_orange),

            stat_timing: Style::default().fg(aurora_yellow),
            stat_selection: Style::default().fg(aurora_purple),
            stat_system: Style::default().fg(frost_dark),
            stat_url: Style::default().fg(polar3),
            stat_label: Style::default().fg(snow0),

            button: Style::default().fg(snow0).bg(polar1),
            button_focused: Style::default()
                .fg(snow2)
                .bg(frost_dark)
                .add_modifier(Modifier::BOLD),
            hint_key: Style::default().fg(frost_cyan),
        }
    }

    /// doom-nord-light color scheme.
    ///
    /// Desaturated Nord accents adapted for light backgrounds.
    pub(crate) fn doom_nord_light() -> Self {
        let base7 = Color::Rgb(96, 114, 140); // #60728C
        let fg = Color::Rgb(59, 66, 82); // #3B4252
        let bg_alt = Color::Rgb(229, 233, 240); // #E5E9F0
        let red = Color::Rgb(153, 50, 75); // #99324B
        let orange = Color::Rgb(172, 68, 38); // #AC4426
        let yellow = Color::Rgb(154, 117, 0); // #9A7500
        let blue = Color::Rgb(59, 110, 168); // #3B6EA8
        let dark_blue = Color::Rgb(82, 114, 175); // #5272AF
        let teal = Color::Rgb(41, 131, 141); // #29838D
        let cyan = Color::Rgb(57, 142, 172); // #398EAC
        let violet = Color::Rgb(132, 40, 121); // #842879

        Self {
            app_name: Style::default().fg(teal).add_modifier(Modifier::BOLD),
            border: Style::default().fg(base7),
            border_focused: Style::default().fg(orange),
            footer_help: Style::default().fg(base7),

            header_row: Style::default().fg(blue).add_modifier(Modifier::BOLD),
            row: Style::default().fg(fg),
            row_selected: Style::default().fg(violet).add_modifier(Modifier::BOLD),

            error: Style::default().fg(red),
            info: Style::default().fg(cyan),
            warn: Style::default().fg(orange),

            stat_timing: Style::default().fg(yellow),
            stat_selection: Style::default().fg(violet),
            stat_system: Style::default().fg(dark_blue),
            stat_url: Style::default().fg(base7),
            stat_label: Style::default().fg(fg),

            button: Style::default().fg(fg).bg(bg_alt),
            button_focused: Style::default()
                .fg(bg_alt)
                .bg(dark_blue)
                .add_modifier(Modifier::BOLD),
            hint_key: Style::default().fg(cyan),
        }
    }
}

/// Complete visual presentation: colors plus text.
pub(crate) struct Theme {
    pub(crate) scheme: ColorScheme,
    pub(crate) labels: Labels,
}

impl Theme {
    pub(crate) fn new(theme_name: ThemeName) -> Self {
        let scheme = match theme_name {
            ThemeName::Nord => ColorScheme::nord(),
            ThemeName::DoomNordLight => ColorScheme::doom_nord_light(),
        };
        Self {
            scheme,
            labels: Labels::en(),
        }
    }
}
