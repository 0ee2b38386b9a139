//! memberdesk-server: headless admin backend for the membership platform.
//!
//! Usage:
//!   memberdesk-server --config config.json
//!   memberdesk-server --db members.db --listen 127.0.0.1:9100
//!
//! Protocol: one JSON request per line, one JSON response per line.
//!   {"op":"customer_login","loginUserName":"alice","loginPassword":"..."}
//!   → {"success":true,"data":{...},"session":{...}}
//! Errors carry the HTTP-equivalent status:
//!   → {"success":false,"error":"Invalid login credentials","status":401}

use anyhow::Result;
use memberdesk_core::{
    auth_service::NewAdmin,
    backend::Backend,
    config::AppConfig,
    customer_admin::{CustomerFilter, CustomerUpdate, NewCustomer},
    error::ServiceError,
    login_tracker::ClientAddr,
};
use serde_json::{json, Map, Value};
use std::env;
use std::io::{BufRead, BufReader, Write};
use std::net::{IpAddr, TcpListener, TcpStream};

#[derive(serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum ApiRequest {
    CustomerLogin {
        #[serde(rename = "loginUserName", default)]
        login_user_name: String,
        #[serde(rename = "loginPassword", default)]
        login_password: String,
        #[serde(rename = "forwardedFor", default)]
        forwarded_for: Option<String>,
    },
    GetCustomerProfile {
        id: i64,
    },
    GetCustomerDetail {
        id: i64,
    },
    ListCustomers {
        #[serde(flatten)]
        filter: CustomerFilter,
    },
    UpdateCustomerSettings {
        id: i64,
        patch: Map<String, Value>,
    },
    CreateCustomer {
        #[serde(flatten)]
        body: NewCustomer,
    },
    UpdateCustomer {
        id: i64,
        #[serde(flatten)]
        body: CustomerUpdate,
    },
    DeleteCustomer {
        id: i64,
    },
    ListVipLevels,
    UpdateVipLevel {
        id: i64,
        patch: Map<String, Value>,
    },
    AdminLogin {
        #[serde(default)]
        name: String,
        #[serde(default)]
        password: String,
    },
    AdminRegister {
        #[serde(flatten)]
        body: NewAdmin,
    },
    ListAdmins {
        #[serde(default)]
        limit: Option<i64>,
    },
    GetAdmin {
        id: i64,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match args.windows(2).find(|w| w[0] == "--config") {
        Some(w) => AppConfig::load(&w[1])?,
        None => AppConfig::default(),
    };
    if let Some(db) = args.windows(2).find(|w| w[0] == "--db") {
        config.db_path = Some(db[1].clone());
    }
    if let Some(listen) = args.windows(2).find(|w| w[0] == "--listen") {
        config.listen_addr = listen[1].clone();
    }
    if args.iter().any(|a| a == "--no-geo") {
        config.geo.enabled = false;
    }

    // Connection handlers each open their own database connection, so a
    // plain :memory: database would be per-handler. Use SQLite's
    // shared-cache URI to give them all the same in-memory database.
    if config.db_path.is_none() {
        config.db_path = Some(format!(
            "file:memberdesk_{}?mode=memory&cache=shared",
            chrono::Utc::now().timestamp()
        ));
    }

    println!("memberdesk-server");
    println!("  db:     {}", config.db_path.as_deref().unwrap_or(":memory:"));
    println!("  listen: {}", config.listen_addr);
    println!("  geo:    {}", if config.geo.enabled { "on" } else { "off" });
    println!();

    // The root backend runs migrations once and keeps a shared
    // in-memory database alive for the process lifetime.
    let root = Backend::connect(&config)?;

    let listener = TcpListener::bind(&config.listen_addr)?;
    log::info!("listening on {}", config.listen_addr);

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                log::warn!("accept failed: {e}");
                continue;
            }
        };
        let config = config.clone();
        std::thread::spawn(move || {
            if let Err(e) = serve_connection(stream, &config) {
                log::warn!("connection ended with error: {e}");
            }
        });
    }

    root.close();
    Ok(())
}

fn serve_connection(stream: TcpStream, config: &AppConfig) -> Result<()> {
    let peer = stream.peer_addr()?.ip();
    let backend = Backend::connect(config)?;

    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = reader.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<ApiRequest>(&buffer) {
            Ok(request) => match dispatch(&backend, request, peer) {
                Ok(response) => response,
                Err(e) => {
                    if e.status_code() == 500 {
                        log::error!("request failed: {e}");
                    }
                    json!({
                        "success": false,
                        "error": e.public_message(),
                        "status": e.status_code(),
                    })
                }
            },
            Err(e) => json!({
                "success": false,
                "error": format!("Malformed request: {e}"),
                "status": 400,
            }),
        };

        writeln!(writer, "{response}")?;
        writer.flush()?;
    }

    backend.close();
    Ok(())
}

/// Map one request to one service call; the error taxonomy maps to
/// status codes in `serve_connection`.
fn dispatch(backend: &Backend, request: ApiRequest, peer: IpAddr) -> Result<Value, ServiceError> {
    match request {
        ApiRequest::CustomerLogin {
            login_user_name,
            login_password,
            forwarded_for,
        } => {
            let client = ClientAddr {
                forwarded_for,
                peer: Some(peer),
            };
            let login = backend
                .auth()
                .authenticate(&login_user_name, &login_password, &client)?;
            let mut response = json!({
                "success": true,
                "data": serde_json::to_value(&login.customer)?,
                "session": serde_json::to_value(&login.session)?,
            });
            if let Some(warning) = login.enrichment_warning {
                response["enrichmentWarning"] = json!(warning);
            }
            Ok(response)
        }
        ApiRequest::GetCustomerProfile { id } => ok(backend.customers().profile(id)?),
        ApiRequest::GetCustomerDetail { id } => ok(backend.customers().detail(id)?),
        ApiRequest::ListCustomers { filter } => ok(backend.customers().list(filter)?),
        ApiRequest::UpdateCustomerSettings { id, patch } => {
            let customer = backend.capability_gate().set_capabilities(id, &patch)?;
            ok(backend.customers().detail(customer.id)?)
        }
        ApiRequest::CreateCustomer { body } => match backend.customers().create(&body) {
            Ok(detail) => ok(detail),
            // Legacy surface: a duplicate login name answers 400 here,
            // unlike the 409 on admin registration.
            Err(ServiceError::Conflict(msg)) => Ok(json!({
                "success": false,
                "error": msg,
                "status": 400,
            })),
            Err(e) => Err(e),
        },
        ApiRequest::UpdateCustomer { id, body } => ok(backend.customers().update(id, &body)?),
        ApiRequest::DeleteCustomer { id } => {
            backend.customers().delete(id)?;
            Ok(json!({"success": true, "message": "Customer deleted successfully"}))
        }
        ApiRequest::ListVipLevels => ok(backend.vip().list()?),
        ApiRequest::UpdateVipLevel { id, patch } => ok(backend.vip().update(id, &patch)?),
        ApiRequest::AdminLogin { name, password } => {
            let session = backend.auth().login_admin(&name, &password)?;
            Ok(json!({
                "success": true,
                "data": serde_json::to_value(&session.admin)?,
                "token": session.session.token,
                "expiresAt": session.session.expires_at,
            }))
        }
        ApiRequest::AdminRegister { body } => ok(backend.auth().register_admin(&body)?),
        ApiRequest::ListAdmins { limit } => ok(backend.auth().list_admins(limit.unwrap_or(50))?),
        ApiRequest::GetAdmin { id } => ok(backend.auth().admin_by_id(id)?),
    }
}

fn ok<T: serde::Serialize>(data: T) -> Result<Value, ServiceError> {
    Ok(json!({
        "success": true,
        "data": serde_json::to_value(data)?,
    }))
}
