use std::collections::BTreeSet;
use std::path::Path;

use crate::chart::{DEFAULT_SIZE, RenderedChart, export};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    /// The chart being shown; never modified while the window is open.
    pub chart: RenderedChart,

    /// Hidden lines as `(subplot index, line index)`.
    pub hidden: BTreeSet<(usize, usize)>,

    /// Pixel size used by "Export…".
    pub export_size: (u32, u32),

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl ViewerState {
    pub fn new(chart: RenderedChart) -> Self {
        Self {
            chart,
            hidden: BTreeSet::new(),
            export_size: DEFAULT_SIZE,
            status_message: None,
        }
    }

    pub fn is_visible(&self, subplot: usize, line: usize) -> bool {
        !self.hidden.contains(&(subplot, line))
    }

    pub fn set_visible(&mut self, subplot: usize, line: usize, visible: bool) {
        if visible {
            self.hidden.remove(&(subplot, line));
        } else {
            self.hidden.insert((subplot, line));
        }
    }

    /// Show every line of one subplot.
    pub fn show_all(&mut self, subplot: usize) {
        self.hidden.retain(|&(s, _)| s != subplot);
    }

    /// Hide every line of one subplot.
    pub fn hide_all(&mut self, subplot: usize) {
        if let Some(sp) = self.chart.subplots.get(subplot) {
            self.hidden.extend((0..sp.lines.len()).map(|l| (subplot, l)));
        }
    }

    /// The chart restricted to the lines currently visible.
    pub fn visible_chart(&self) -> RenderedChart {
        let mut chart = self.chart.clone();
        for (s, subplot) in chart.subplots.iter_mut().enumerate() {
            let mut idx = 0;
            subplot.lines.retain(|_| {
                let keep = self.is_visible(s, idx);
                idx += 1;
                keep
            });
        }
        chart
    }

    /// Export what is on screen, recording the outcome in the status line.
    pub fn export_visible(&mut self, path: &Path) -> Result<()> {
        let result = export(&self.visible_chart(), path, self.export_size);
        self.status_message = Some(match &result {
            Ok(()) => format!("Exported to {}", path.display()),
            Err(e) => format!("Error: {e}"),
        });
        result
    }
}
