use std::any::Any;
use std::rc::Rc;

use serde_json::Value;

use crate::registry::EntityRef;

/// Handle to a renderable owned by the rendering layer. The overlay keeps
/// the handle so the renderer can dispatch on it; it never inspects or
/// deep-copies the component.
pub type ComponentHandle = Rc<dyn Any>;

/// Anchor a tooltip is shown against.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipTarget {
    pub x: f64,
    pub y: f64,
    pub entity: Option<EntityRef>,
}

impl TooltipTarget {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            entity: None,
        }
    }

    pub fn for_entity(x: f64, y: f64, entity: EntityRef) -> Self {
        Self {
            x,
            y,
            entity: Some(entity),
        }
    }
}

/// Transient overlay state for the single active tooltip. Showing a new
/// tooltip replaces the previous one atomically.
#[derive(Clone, Default)]
pub struct TooltipState {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
    pub target: Option<EntityRef>,
    pub component: Option<ComponentHandle>,
    pub binds: Option<Value>,
}

impl TooltipState {
    pub fn show(&mut self, target: TooltipTarget, component: ComponentHandle, binds: Option<Value>) {
        let TooltipTarget { x, y, entity } = target;
        *self = Self {
            x,
            y,
            width: 0.0,
            height: 0.0,
            visible: true,
            target: entity,
            component: Some(component),
            binds,
        };
    }

    /// Idempotent.
    pub fn hide(&mut self) {
        *self = Self::default();
    }
}

impl std::fmt::Debug for TooltipState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TooltipState")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("visible", &self.visible)
            .field("target", &self.target)
            .field("component", &self.component.as_ref().map(|_| "<renderable>"))
            .field("binds", &self.binds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::EntityKind;
    use serde_json::json;

    #[test]
    fn show_positions_from_the_target() {
        let mut tooltip = TooltipState::default();
        tooltip.show(
            TooltipTarget::for_entity(40.0, 96.0, EntityRef::new(EntityKind::Table, "users")),
            Rc::new("users-card"),
            Some(json!({ "pinned": false })),
        );

        assert!(tooltip.visible);
        assert_eq!((tooltip.x, tooltip.y), (40.0, 96.0));
        assert_eq!(tooltip.target.as_ref().unwrap().id, "users");
        assert!(tooltip.component.is_some());
    }

    #[test]
    fn show_replaces_the_previous_tooltip() {
        let mut tooltip = TooltipState::default();
        tooltip.show(TooltipTarget::at(1.0, 2.0), Rc::new("a"), None);
        tooltip.show(TooltipTarget::at(3.0, 4.0), Rc::new("b"), None);

        assert_eq!((tooltip.x, tooltip.y), (3.0, 4.0));
        let component = tooltip.component.as_ref().unwrap();
        assert_eq!(*component.downcast_ref::<&str>().unwrap(), "b");
    }

    #[test]
    fn hide_clears_everything_and_is_idempotent() {
        let mut tooltip = TooltipState::default();
        tooltip.show(
            TooltipTarget::at(9.0, 9.0),
            Rc::new("card"),
            Some(json!({ "row": 3 })),
        );

        tooltip.hide();
        tooltip.hide();

        assert!(!tooltip.visible);
        assert_eq!((tooltip.x, tooltip.y), (0.0, 0.0));
        assert_eq!((tooltip.width, tooltip.height), (0.0, 0.0));
        assert!(tooltip.target.is_none());
        assert!(tooltip.component.is_none());
        assert!(tooltip.binds.is_none());
    }
}
