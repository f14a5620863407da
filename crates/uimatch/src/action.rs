//! Action vocabulary handed to the engine.
//!
//! Gesture synthesis belongs to the engine; these types only describe what
//! to do.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default step for directional scrolls, in points
pub const DEFAULT_SCROLL_STEP: f64 = 400.0;

/// Gesture direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards the left edge
    Left,
    /// Towards the right edge
    Right,
    /// Towards the top edge
    Up,
    /// Towards the bottom edge
    Down,
}

impl Direction {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Content edge reached by scrolling in this direction
    #[must_use]
    pub const fn edge(&self) -> ContentEdge {
        match self {
            Self::Left => ContentEdge::Left,
            Self::Right => ContentEdge::Right,
            Self::Up => ContentEdge::Top,
            Self::Down => ContentEdge::Bottom,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge of a scrollable container's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEdge {
    /// Left edge
    Left,
    /// Right edge
    Right,
    /// Top edge
    Top,
    /// Bottom edge
    Bottom,
}

impl fmt::Display for ContentEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

/// Swipe speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwipeSpeed {
    /// Slow swipe (default)
    #[default]
    Slow,
    /// Fast swipe
    Fast,
}

/// An action the engine performs on a located element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Single tap
    Tap,
    /// Swipe gesture
    Swipe {
        /// Swipe direction
        direction: Direction,
        /// Swipe speed
        speed: SwipeSpeed,
    },
    /// Type text at the current cursor
    TypeText(String),
    /// Replace the whole text content
    ReplaceText(String),
    /// Clear the text content
    ClearText,
    /// Scroll by an offset
    Scroll {
        /// Scroll direction
        direction: Direction,
        /// Offset in points
        offset: f64,
    },
    /// Scroll until the given content edge is reached
    ScrollToContentEdge(ContentEdge),
    /// Engine-specific action identified by name
    Custom(String),
}

impl Action {
    /// Slow swipe
    #[must_use]
    pub const fn swipe(direction: Direction) -> Self {
        Self::Swipe {
            direction,
            speed: SwipeSpeed::Slow,
        }
    }

    /// Fast swipe
    #[must_use]
    pub const fn swipe_fast(direction: Direction) -> Self {
        Self::Swipe {
            direction,
            speed: SwipeSpeed::Fast,
        }
    }

    /// Type text
    #[must_use]
    pub fn type_text(text: impl Into<String>) -> Self {
        Self::TypeText(text.into())
    }

    /// Replace text
    #[must_use]
    pub fn replace_text(text: impl Into<String>) -> Self {
        Self::ReplaceText(text.into())
    }

    /// Custom action
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tap => write!(f, "tap"),
            Self::Swipe {
                direction,
                speed: SwipeSpeed::Slow,
            } => write!(f, "swipe({direction})"),
            Self::Swipe {
                direction,
                speed: SwipeSpeed::Fast,
            } => write!(f, "swipeFast({direction})"),
            Self::TypeText(text) => write!(f, "typeText('{text}')"),
            Self::ReplaceText(text) => write!(f, "replaceText('{text}')"),
            Self::ClearText => write!(f, "clearText"),
            Self::Scroll { direction, offset } => write!(f, "scroll({direction}, {offset})"),
            Self::ScrollToContentEdge(edge) => write!(f, "scrollToContentEdge({edge})"),
            Self::Custom(name) => write!(f, "custom('{name}')"),
        }
    }
}

/// Scroll amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScrollOffset {
    /// Scroll by a fixed step
    Step(f64),
    /// Scroll all the way to the content edge
    ContentEdge,
}

impl Default for ScrollOffset {
    fn default() -> Self {
        Self::Step(DEFAULT_SCROLL_STEP)
    }
}

/// A directional scroll used when searching for off-screen elements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scroll {
    /// Scroll direction
    pub direction: Direction,
    /// Scroll amount
    pub offset: ScrollOffset,
}

impl Scroll {
    /// Create a scroll
    #[must_use]
    pub const fn new(direction: Direction, offset: ScrollOffset) -> Self {
        Self { direction, offset }
    }

    /// Scroll up by the default step
    #[must_use]
    pub fn up() -> Self {
        Self::new(Direction::Up, ScrollOffset::default())
    }

    /// Scroll down by the default step
    #[must_use]
    pub fn down() -> Self {
        Self::new(Direction::Down, ScrollOffset::default())
    }

    /// Scroll left by the default step
    #[must_use]
    pub fn left() -> Self {
        Self::new(Direction::Left, ScrollOffset::default())
    }

    /// Scroll right by the default step
    #[must_use]
    pub fn right() -> Self {
        Self::new(Direction::Right, ScrollOffset::default())
    }

    /// Use a custom step
    #[must_use]
    pub const fn with_step(mut self, step: f64) -> Self {
        self.offset = ScrollOffset::Step(step);
        self
    }

    /// Scroll to the content edge instead of stepping
    #[must_use]
    pub const fn to_edge(mut self) -> Self {
        self.offset = ScrollOffset::ContentEdge;
        self
    }

    /// The action the engine performs
    #[must_use]
    pub fn action(&self) -> Action {
        match self.offset {
            ScrollOffset::Step(offset) => Action::Scroll {
                direction: self.direction,
                offset,
            },
            ScrollOffset::ContentEdge => Action::ScrollToContentEdge(self.direction.edge()),
        }
    }
}
