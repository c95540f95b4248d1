use anyhow::{anyhow, Result};
use colored::*;
use serde_json::{json, Value};
use std::io::{self, Write};

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

struct Session {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("{}", "🚚 Dashboard de Flota - Testing Tool".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    let base_url = prompt(&format!("URL del servidor [{}]: ", DEFAULT_BASE_URL))?;
    let base_url = if base_url.is_empty() {
        DEFAULT_BASE_URL.to_string()
    } else {
        base_url.trim_end_matches('/').to_string()
    };

    let client = reqwest::Client::new();
    check_health(&client, &base_url).await?;

    let session = authenticate(client, base_url).await?;

    loop {
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 💰 Dashboard financiero");
        println!("2. 🚛 Eficiencia operativa");
        println!("3. 🌡️  Control de calidad");
        println!("4. 🚨 Alertas de temperatura");
        println!("5. 📋 Acciones ejecutivas");
        println!("6. 📅 Agenda del mes");
        println!("7. 🚪 Cerrar sesión y salir");

        let choice = prompt("Selecciona una opción (1-7): ")?;
        let result = match choice.as_str() {
            "1" => get(&session, "/api/dashboard/financiero").await,
            "2" => get(&session, "/api/dashboard/operativo").await,
            "3" => {
                let cedis = prompt("CEDIS (all, cedis1..cedis4) [all]: ")?;
                let rango = prompt("Rango (today, week, month) [month]: ")?;
                get(&session, &quality_path("/api/dashboard/calidad", &cedis, &rango)).await
            }
            "4" => {
                let cedis = prompt("CEDIS (all, cedis1..cedis4) [all]: ")?;
                get(&session, &quality_path("/api/dashboard/calidad/alertas", &cedis, "")).await
            }
            "5" => get(&session, "/api/acciones").await,
            "6" => get(&session, "/api/agenda").await,
            "7" => {
                logout(&session).await?;
                println!("{}", "👋 ¡Hasta luego!".bright_green());
                break;
            }
            _ => {
                println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red());
                continue;
            }
        };

        if let Err(e) = result {
            println!("{} {}", "❌".bright_red(), e);
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

fn quality_path(base: &str, cedis: &str, rango: &str) -> String {
    let mut params = Vec::new();
    if !cedis.is_empty() {
        params.push(format!("cedis={}", cedis));
    }
    if !rango.is_empty() {
        params.push(format!("rango={}", rango));
    }
    if params.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, params.join("&"))
    }
}

async fn check_health(client: &reqwest::Client, base_url: &str) -> Result<()> {
    println!("{}", "🏥 Verificando servidor...".bright_cyan());
    let body: Value = client
        .get(format!("{}/health", base_url))
        .send()
        .await?
        .json()
        .await?;
    println!(
        "{} {} (datos: {})",
        "✅ Servidor activo:".bright_green(),
        body["version"],
        body["data_source"]
    );
    Ok(())
}

async fn authenticate(client: reqwest::Client, base_url: String) -> Result<Session> {
    println!();
    println!("{}", "🔐 INICIAR SESIÓN".bright_cyan().bold());
    println!("{}", "=================".bright_cyan());

    let email = prompt("Correo: ")?;
    let password = prompt("Contraseña: ")?;

    let response = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    let status = response.status();
    let body: Value = response.json().await?;

    if !status.is_success() {
        return Err(anyhow!(
            "Inicio de sesión rechazado ({}): {}",
            status,
            body["notification"]["message"]
        ));
    }

    let token = body["session"]["token"]
        .as_str()
        .ok_or_else(|| anyhow!("La respuesta no trae token de sesión"))?
        .to_string();

    println!("{}", "✅ Sesión iniciada".bright_green());
    Ok(Session {
        base_url,
        token,
        client,
    })
}

async fn get(session: &Session, path: &str) -> Result<()> {
    println!("{} {}", "📤 GET".bright_blue(), path);
    let response = session
        .client
        .get(format!("{}{}", session.base_url, path))
        .bearer_auth(&session.token)
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    if status.is_success() {
        println!("{} {}", "📥".bright_green(), status);
    } else {
        println!("{} {}", "📥".bright_red(), status);
    }
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn logout(session: &Session) -> Result<()> {
    let response = session
        .client
        .post(format!("{}/api/auth/logout", session.base_url))
        .bearer_auth(&session.token)
        .send()
        .await?;
    println!("{} {}", "🚪 Logout:".bright_blue(), response.status());
    Ok(())
}
