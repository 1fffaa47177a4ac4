//! Temporal content: an ordered timeline of tagged events.
//!
//! Operands are laid out one after another in source order. Each event's
//! offset is shifted by the total duration of everything before it, so a
//! timeline reads like a schedule. Prefix and postfix operators with temporal
//! weight stretch or delay their operand's timeline.

use std::fmt::Write as _;

use kspk_core::{Dimension, SymbolId, SymbolTable};
use kspk_parser::NodeId;

use crate::compose::{NodeContext, Role};

use super::Layer;

/// One timed occurrence of a symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalEvent {
    pub offset: f64,
    pub duration: f64,
    pub tag: SymbolId,
    pub source: NodeId,
}

/// Events in source order plus the total span they occupy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeline {
    events: Vec<TemporalEvent>,
    duration: f64,
}

impl Timeline {
    pub fn events(&self) -> &[TemporalEvent] {
        &self.events
    }

    /// Total duration, including any leading delay.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn single(tag: SymbolId, source: NodeId, duration: f64) -> Self {
        Self {
            events: vec![TemporalEvent {
                offset: 0.0,
                duration,
                tag,
                source,
            }],
            duration,
        }
    }

    /// Append `other` after the end of this timeline.
    fn append(&mut self, other: Timeline) {
        let base = self.duration;
        self.events.extend(other.events.into_iter().map(|event| TemporalEvent {
            offset: event.offset + base,
            ..event
        }));
        self.duration += other.duration;
    }

    fn scaled(mut self, factor: f64) -> Self {
        for event in &mut self.events {
            event.offset *= factor;
            event.duration *= factor;
        }
        self.duration *= factor;
        self
    }

    fn delayed(mut self, delay: f64) -> Self {
        for event in &mut self.events {
            event.offset += delay;
        }
        self.duration += delay;
        self
    }

    /// Prepend an event spanning the whole timeline.
    fn with_marker(mut self, tag: SymbolId, source: NodeId) -> Self {
        self.events.insert(
            0,
            TemporalEvent {
                offset: 0.0,
                duration: self.duration,
                tag,
                source,
            },
        );
        self
    }

    /// Render as `key@offset+duration` entries, e.g. `[⧖@0+2, ✧@0+2]`.
    pub fn render(&self, table: &SymbolTable) -> String {
        let mut out = String::from("[");
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            // Writing into a String cannot fail.
            let _ = write!(
                out,
                "{}@{}+{}",
                table.key(event.tag),
                event.offset,
                event.duration
            );
        }
        out.push(']');
        out
    }
}

/// Builds [`Timeline`] content.
pub(crate) struct TemporalLayer;

impl Layer for TemporalLayer {
    type Content = Timeline;

    fn dimension(&self) -> Dimension {
        Dimension::Temporal
    }

    fn combine(&mut self, node: &NodeContext<'_>, children: Vec<Timeline>) -> Timeline {
        let weight = node.weight(Dimension::Temporal);
        let own = node.symbol().filter(|_| weight != 0.0);

        match node.role() {
            Role::Literal => Timeline::default(),
            Role::Prefix | Role::Postfix => {
                let child = children.into_iter().next().unwrap_or_default();
                let Some(tag) = own else {
                    return child;
                };
                if child.is_empty() {
                    return Timeline::single(tag, node.id(), weight.abs());
                }

                let adjusted = if weight > 0.0 {
                    child.scaled(weight)
                } else {
                    child.delayed(-weight)
                };
                adjusted.with_marker(tag, node.id())
            }
            // Left operand, the node's own event, then the remaining operands.
            Role::Atom | Role::Binary | Role::Group => {
                let mut children = children.into_iter();
                let mut timeline = children.next().unwrap_or_default();
                if let Some(tag) = own {
                    timeline.append(Timeline::single(tag, node.id(), weight.abs()));
                }
                for child in children {
                    timeline.append(child);
                }
                timeline
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use kspk_core::{Associativity, SymbolDefinition, SymbolTable};

    use crate::{MessageBuilder, config::AppConfig};

    use super::*;

    /// `a` (1), `b` (3), `→` (1, right), `>` prefix (2), `<` prefix (-2),
    /// `~` prefix without temporal weight.
    fn builder() -> MessageBuilder {
        let table = SymbolTable::builder()
            .symbols([
                SymbolDefinition::atom("a").with_weight(Dimension::Temporal, 1.0),
                SymbolDefinition::atom("b").with_weight(Dimension::Temporal, 3.0),
                SymbolDefinition::atom("c"),
                SymbolDefinition::binary("→", 1, Associativity::Right)
                    .with_weight(Dimension::Temporal, 1.0),
                SymbolDefinition::unary(">", 5).with_weight(Dimension::Temporal, 2.0),
                SymbolDefinition::unary("<", 5).with_weight(Dimension::Temporal, -2.0),
                SymbolDefinition::unary("~", 5),
            ])
            .build()
            .unwrap();
        MessageBuilder::new(AppConfig::default(), table.into())
    }

    fn timeline(source: &str) -> (Timeline, String) {
        let builder = builder();
        let message = builder.process(source).unwrap();
        let timeline = message.temporal().clone();
        let rendered = timeline.render(builder.table());
        (timeline, rendered)
    }

    #[test]
    fn test_atoms_follow_each_other() {
        let (timeline, rendered) = timeline("a b");
        assert_eq!(rendered, "[a@0+1, b@1+3]");
        assert_approx_eq!(f64, timeline.duration(), 4.0);
    }

    #[test]
    fn test_binary_event_sits_between_operands() {
        let (timeline, rendered) = timeline("a→b");
        assert_eq!(rendered, "[a@0+1, →@1+1, b@2+3]");
        assert_approx_eq!(f64, timeline.duration(), 5.0);
    }

    #[test]
    fn test_positive_prefix_scales() {
        let (timeline, rendered) = timeline(">a");
        assert_eq!(rendered, "[>@0+2, a@0+2]");
        assert_approx_eq!(f64, timeline.duration(), 2.0);
    }

    #[test]
    fn test_negative_prefix_delays() {
        let (timeline, rendered) = timeline("<a");
        assert_eq!(rendered, "[<@0+3, a@2+1]");
        assert_approx_eq!(f64, timeline.duration(), 3.0);
    }

    #[test]
    fn test_prefix_over_timeless_operand_is_an_event() {
        let (_, rendered) = timeline(">c");
        assert_eq!(rendered, "[>@0+2]");
    }

    #[test]
    fn test_unweighted_prefix_passes_through() {
        let (_, rendered) = timeline("~a b");
        assert_eq!(rendered, "[a@0+1, b@1+3]");
    }

    #[test]
    fn test_timeless_expression_is_empty() {
        let (timeline, rendered) = timeline("c");
        assert!(timeline.is_empty());
        assert_eq!(rendered, "[]");
        assert_approx_eq!(f64, timeline.duration(), 0.0);
    }
}
