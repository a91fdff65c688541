//! # Server Picker View
//!
//! Form for choosing the server the window opens on.

use std::sync::Arc;

use dioxus::prelude::*;
use jupiter_shell::{PickServerResult, Shell};
use serde_json::{json, Value};

use crate::window::DesktopWindow;

/// Shell handle provided as root context.
pub type SharedShell = Arc<Shell<DesktopWindow>>;

/// Server picker component.
///
/// Submitting runs the handshake; on success the shell navigates the window
/// away, on failure the message is shown and the form stays enabled.
#[component]
pub fn ServerPicker() -> Element {
    let shell = use_context::<SharedShell>();
    let mut server_input = use_signal(|| shell.web_ui_url());
    let busy = use_signal(|| false);
    let error = use_signal(|| Option::<String>::None);

    let current = shell.web_ui_url();
    let hosted = shell.hosted_global_web_ui_url();
    let version = shell.env().client_version.to_string();

    let on_connect = {
        let shell = shell.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let server = server_input.read().clone();
            pick(shell.clone(), server, busy, error);
        }
    };

    let on_hosted = {
        let shell = shell.clone();
        let hosted = hosted.clone();
        move |_: MouseEvent| pick(shell.clone(), hosted.clone(), busy, error)
    };

    let on_exit = {
        let shell = shell.clone();
        move |_: MouseEvent| {
            let shell = shell.clone();
            spawn(async move {
                if let Err(e) = shell.dispatch("exit", Value::Null).await {
                    tracing::error!(error = %e, "Exit failed");
                }
            });
        }
    };

    rsx! {
        div {
            class: "server-picker",

            h2 { "Choose your Jupiter server" }

            p {
                "Last used: "
                span { class: "mono", "{current}" }
            }

            form {
                onsubmit: on_connect,

                label { "Server address" }

                input {
                    r#type: "text",
                    placeholder: "my-instance.io",
                    value: "{server_input}",
                    disabled: *busy.read(),
                    oninput: move |evt| server_input.set(evt.value()),
                }

                div {
                    class: "btn-group",

                    button {
                        r#type: "submit",
                        class: "btn-primary",
                        disabled: *busy.read(),
                        if *busy.read() { "Connecting..." } else { "Connect" }
                    }

                    button {
                        r#type: "button",
                        class: "btn-secondary",
                        disabled: *busy.read(),
                        onclick: on_hosted,
                        "Use hosted server"
                    }

                    button {
                        r#type: "button",
                        class: "btn-danger",
                        onclick: on_exit,
                        "Quit"
                    }
                }
            }

            if let Some(msg) = error.read().as_ref() {
                div {
                    class: "alert alert-error",
                    "{msg}"
                }
            }

            p {
                class: "text-muted",
                "Hosted server: {hosted} · App version {version}"
            }
        }
    }
}

/// Runs a pick through the IPC table, surfacing failures in `error`.
fn pick(
    shell: SharedShell,
    server: String,
    mut busy: Signal<bool>,
    mut error: Signal<Option<String>>,
) {
    busy.set(true);
    error.set(None);

    spawn(async move {
        let outcome = shell
            .dispatch("pick-server", json!([server]))
            .await
            .map_err(|e| e.to_string())
            .and_then(|v| serde_json::from_value::<PickServerResult>(v).map_err(|e| e.to_string()));

        match outcome {
            Ok(PickServerResult::Ok) => {}
            Ok(PickServerResult::Error { error_msg }) => error.set(Some(error_msg)),
            Err(e) => error.set(Some(e)),
        }
        busy.set(false);
    });
}
