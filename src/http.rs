use std::borrow::Cow;
use std::error::Error;
use std::io::Read;
use std::net::ToSocketAddrs;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use json::object;
use tiny_http::{Method, Response};

use crate::mode::AwayMode;
use crate::{DoorState, State};

const HTML: &str = include_str!("home.html");

pub struct Server(tiny_http::Server);

impl Server {
    pub fn new<A>(addr: A) -> Result<Server, Box<dyn Error + Send + Sync + 'static>>
    where
        A: ToSocketAddrs,
    {
        tiny_http::Server::http(addr).map(Server)
    }

    pub fn handle_requests(&self, state: Arc<RwLock<State>>, away: AwayMode) {
        let json_content = "Content-type: application/json; charset=utf-8"
            .parse::<tiny_http::Header>()
            .unwrap();
        let html_content = "Content-type: text/html; charset=utf-8"
            .parse::<tiny_http::Header>()
            .unwrap();
        for mut request in self.0.incoming_requests() {
            let method = request.method().clone();
            let url = request.url().to_owned();
            let response = match (method, url.as_str()) {
                (Method::Get, "/") => {
                    let current_state = { *state.read().unwrap() };
                    let status = match current_state.door_state {
                        DoorState::Open => {
                            let duration = current_state
                                .open_since
                                .map(|opened| {
                                    let now = Instant::now();
                                    let duration = now.duration_since(opened);
                                    let formatter = timeago::Formatter::new();
                                    Cow::from(formatter.convert(duration))
                                })
                                .unwrap_or_else(|| Cow::from("at an unknown time"));
                            format!("🔴 Opened {}", duration)
                        }
                        DoorState::Closed => String::from("🟢 Closed"),
                    };
                    let mode = if away.get() { "away" } else { "home" };
                    let html = HTML
                        .replace("$doorstate$", &status)
                        .replace("$awaymode$", mode);
                    Response::from_string(html).with_header(html_content.clone())
                }
                (Method::Get, "/door.json") => {
                    let now = Instant::now();
                    let current_state = state.read().unwrap();
                    let obj = object! {
                        state: current_state.door_state.to_string(),
                        away: away.get(),
                        secs_since_notified: current_state.notified_at.map(|notified| now.duration_since(notified).as_secs()),
                        open_for: current_state.open_since.map(|opened| now.duration_since(opened).as_secs())
                    };
                    let body = json::stringify_pretty(obj, 2);
                    Response::from_string(body).with_header(json_content.clone())
                }
                (Method::Get, "/mode") => {
                    let body = json::stringify(object! { away: away.get() });
                    Response::from_string(body).with_header(json_content.clone())
                }
                // ModeController: body is "away" or "home". Unauthenticated,
                // meant for the local network only.
                (Method::Post, "/mode") => {
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);
                    match body.trim() {
                        "away" => away.away(),
                        "home" => away.home(),
                        _ => {
                            let _ = request
                                .respond(Response::from_string("Bad request").with_status_code(400));
                            continue;
                        }
                    }
                    log::info!("mode set to {}", body.trim());
                    let body = json::stringify(object! { away: away.get() });
                    Response::from_string(body).with_header(json_content.clone())
                }
                _ => Response::from_string("Not found").with_status_code(404),
            };

            // Ignoring I/O errors that occur here so that we don't take down the process if there
            // is an issue sending the response.
            let _ = request.respond(response);
        }
    }

    pub fn shutdown(&self) {
        self.0.unblock();
    }
}
