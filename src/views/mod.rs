pub mod pages;

use axum::Router;
use axum::routing::get;

use crate::pages::PAGES;
use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    let mut router = Router::new();
    for page in PAGES {
        router = router.route(page.path, get(pages::show));
        for alias in page.aliases {
            router = router.route(alias, get(pages::show));
        }
    }
    router.fallback(pages::not_found)
}
