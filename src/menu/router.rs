#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ReloadState,
    Quit,
}

pub struct EventRoute {
    pub id: &'static str,
    pub action: MenuAction,
}

impl EventRoute {
    pub fn matches(&self, event_id: &str) -> bool {
        self.id == event_id
    }
}

pub struct EventRouter {
    routes: Vec<EventRoute>,
}

impl EventRouter {
    pub fn new(routes: Vec<EventRoute>) -> Self {
        Self { routes }
    }

    /// First matching route wins.
    pub fn route(&self, event_id: &str) -> Option<MenuAction> {
        let action = self
            .routes
            .iter()
            .find(|route| route.matches(event_id))
            .map(|route| route.action);

        if action.is_none() {
            log::warn!("No route found for event: {}", event_id);
        }
        action
    }
}
