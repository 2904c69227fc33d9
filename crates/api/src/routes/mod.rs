pub mod achievements;
pub mod agency;
pub mod auth;
pub mod billing;
pub mod blog;
pub mod calculators;
pub mod checklists;
pub mod clients;
pub mod health;
pub mod recharges;
pub mod referrals;
pub mod reports;
pub mod telemetry;
pub mod usage_sessions;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Everything under `/api/v1`. Unless marked otherwise a route needs a
/// bearer token and only sees the caller's agency.
///
/// ```text
/// /auth/register                                   register agency + owner (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout
/// /auth/me                                         current user
///
/// /agency                                          get, update (owner)
/// /agency/managers                                 list, create (owner)
/// /agency/managers/{id}                            update (owner)
///
/// /clients                                         list, create
/// /clients/{id}                                    get, update, delete
///
/// /reports                                         list, create
/// /reports/{id}                                    get, update, delete
/// /reports/{id}/summary                            metrics payload for PDF export
///
/// /checklists                                      list, create (optional template)
/// /checklists/{id}                                 get (with items), update, delete
/// /checklists/{id}/items                           add item
/// /checklists/{id}/items/{item_id}                 update/toggle, delete item
///
/// /recharges                                       calendar window, create
/// /recharges/forecast                              balance forecast
/// /recharges/{id}                                  get, update, delete
/// /recharges/{id}/complete                         mark done
///
/// /achievements                                    catalog with progress
/// /achievements/check                              evaluate (throttled)
///
/// /usage-sessions                                  start
/// /usage-sessions/stats                            totals for the caller
/// /usage-sessions/{id}                             autosave duration
/// /usage-sessions/{id}/beacon                      end of session (always 204)
///
/// /telemetry/errors                                report (always 202), list groups (admin)
/// /telemetry/errors/occurrences                    reports for one fingerprint (admin)
///
/// /referrals                                       list, invite
/// /referrals/summary                               code, counts, rewards
///
/// /billing/checkout                                hosted checkout (owner)
/// /billing/portal                                  billing portal (owner)
/// /billing/webhook                                 processor webhook (signed)
/// /billing/subscription                            current subscription
///
/// /blog/posts                                      published posts (public)
/// /blog/posts/{slug}                               get (public)
/// /blog/posts/{slug}/view                          count a view (public)
/// /blog/posts/{slug}/like                          toggle like (public)
/// /blog/admin/posts                                list all, create (admin)
/// /blog/admin/posts/{id}                           update, delete (admin)
///
/// /calculators                                     available kinds (public)
/// /calculators/{kind}                              compute one metric (public)
///
/// /dashboard/summary                               agency overview
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/agency", agency::router())
        .nest("/clients", clients::router())
        .nest("/reports", reports::router())
        .nest("/checklists", checklists::router())
        .nest("/recharges", recharges::router())
        .nest("/achievements", achievements::router())
        .nest("/usage-sessions", usage_sessions::router())
        .nest("/telemetry", telemetry::router())
        .nest("/referrals", referrals::router())
        .nest("/billing", billing::router())
        .nest("/blog", blog::router())
        .nest("/calculators", calculators::router())
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
}
