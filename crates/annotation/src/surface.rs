use std::collections::BTreeSet;

use model::{Bounds, Coordinate, LineStyle};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::feedback::PromptView;

/// Handle of something drawn onto a [`MapSurface`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct LayerId(pub u64);

/// The host that actually displays the map.
pub trait MapSurface: Send {
    fn add_marker(&mut self, at: &Coordinate) -> LayerId;

    fn add_polyline(&mut self, points: &[Coordinate], style: &LineStyle) -> LayerId;

    /// Shows a transient overlay, removed again via [`MapSurface::remove_layer`].
    fn add_overlay(&mut self, view: &PromptView) -> LayerId;

    fn remove_layer(&mut self, layer: LayerId);

    fn get_bounds(&self) -> Option<Bounds>;

    /// Called when the host reports a new visible area.
    fn update_bounds(&mut self, bounds: Bounds);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    AddMarker {
        layer: LayerId,
        at: Coordinate,
    },
    AddPolyline {
        layer: LayerId,
        points: Vec<Coordinate>,
        style: LineStyle,
    },
    ShowOverlay {
        layer: LayerId,
        view: PromptView,
    },
    RemoveLayer {
        layer: LayerId,
    },
}

/// Surface that keeps track of its layers and queues every change as a
/// [`DrawCommand`] for a remote host to replay.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_layer: u64,
    live: BTreeSet<LayerId>,
    bounds: Option<Bounds>,
    pending: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> LayerId {
        self.next_layer += 1;
        let layer = LayerId(self.next_layer);
        self.live.insert(layer);
        layer
    }

    pub fn is_live(&self, layer: LayerId) -> bool {
        self.live.contains(&layer)
    }

    pub fn live_layers(&self) -> usize {
        self.live.len()
    }

    /// Commands queued since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[DrawCommand] {
        &self.pending
    }
}

impl MapSurface for RecordingSurface {
    fn add_marker(&mut self, at: &Coordinate) -> LayerId {
        let layer = self.allocate();
        self.pending.push(DrawCommand::AddMarker { layer, at: *at });
        layer
    }

    fn add_polyline(&mut self, points: &[Coordinate], style: &LineStyle) -> LayerId {
        let layer = self.allocate();
        self.pending.push(DrawCommand::AddPolyline {
            layer,
            points: points.to_vec(),
            style: style.clone(),
        });
        layer
    }

    fn add_overlay(&mut self, view: &PromptView) -> LayerId {
        let layer = self.allocate();
        self.pending.push(DrawCommand::ShowOverlay {
            layer,
            view: view.clone(),
        });
        layer
    }

    fn remove_layer(&mut self, layer: LayerId) {
        if self.live.remove(&layer) {
            self.pending.push(DrawCommand::RemoveLayer { layer });
        } else {
            log::warn!("Tried to remove unknown layer {:?}.", layer);
        }
    }

    fn get_bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    fn update_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_are_tracked_and_recorded() {
        let mut surface = RecordingSurface::new();
        let at = Coordinate::new(33.18, 131.62).unwrap();
        let marker = surface.add_marker(&at);
        let line = surface.add_polyline(&[at, at], &LineStyle::road_overlay());
        assert_ne!(marker, line);
        assert_eq!(surface.live_layers(), 2);

        surface.remove_layer(line);
        assert!(!surface.is_live(line));
        assert!(surface.is_live(marker));

        let commands = surface.drain();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[2], DrawCommand::RemoveLayer { layer: line });
        assert!(surface.pending().is_empty());
    }

    #[test]
    fn removing_unknown_layer_records_nothing() {
        let mut surface = RecordingSurface::new();
        surface.remove_layer(LayerId(42));
        assert!(surface.drain().is_empty());
    }
}
