// Library root
// -----------
// The binary (`main.rs`) drives the terminal flows in `ui`; everything the
// flows decide lives in the other modules so it can be tested without a
// terminal.
//
// Module responsibilities:
// - `api`: HTTP calls to the booking backend, behind the `BookingApi` and
//   `ProfileApi` traits.
// - `booking`, `selection`, `slots`, `confirmation`: the booking screen.
// - `profile`: profile form validation and avatar upload.
// - `session`: signed-in user and token, persisted between runs.
// - `config`, `error`, `models`: shared plumbing.
pub mod api;
pub mod booking;
pub mod config;
pub mod confirmation;
pub mod error;
pub mod models;
pub mod profile;
pub mod selection;
pub mod session;
pub mod slots;
pub mod ui;
