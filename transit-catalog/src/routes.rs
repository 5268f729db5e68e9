use transit_shared::models::Route;

/// Read-only catalog of bookable routes.
#[derive(Debug, Clone)]
pub struct RouteCatalog {
    routes: Vec<Route>,
}

impl RouteCatalog {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Catalog with the routes served at launch.
    pub fn seeded() -> Self {
        Self::new(vec![
            Route::new("DSM-MWZ-001", "Dar es Salaam", "Mwanza", 45000, "TZS", 22),
            Route::new("DSM-ARU-001", "Dar es Salaam", "Arusha", 35000, "TZS", 10),
            Route::new("DSM-MBY-001", "Dar es Salaam", "Mbeya", 40000, "TZS", 14),
        ])
    }

    /// All routes, in seed order.
    pub fn list_routes(&self) -> Vec<Route> {
        self.routes.clone()
    }

    /// Exact-match lookup by route id.
    pub fn find_route(&self, route_id: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.id == route_id)
    }
}

impl Default for RouteCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}
