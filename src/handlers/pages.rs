// Health check and server-rendered pages for the sign-in and callback flow
use crate::models::HealthResponse;
use crate::settings::DaringSettings;
use actix_web::{HttpResponse, Result};

/// Health check endpoint
///
/// # Errors
/// Never fails; the `Result` matches the other handlers
pub async fn health() -> Result<HttpResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        message: format!("Daring Different backend {} is running", crate::VERSION),
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Escape text for interpolation into HTML
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Sign-in page listing the enabled identity providers
#[must_use]
pub fn generate_sign_in_page(settings: &DaringSettings, error: Option<&str>) -> String {
    let provider_buttons = generate_provider_buttons(settings);
    let error_banner = error
        .filter(|e| !e.trim().is_empty())
        .map(|e| format!(r#"<div class="error" role="alert">{}</div>"#, escape_html(e)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sign In - Daring Different</title>
    <style>{styles}</style>
</head>
<body>
    <div class="container">
        <div class="card">
            <h1>Sign In</h1>
            <p>Welcome back to Daring Different</p>
            {error_banner}
            <div class="button-container">
                {provider_buttons}
            </div>
        </div>
    </div>
</body>
</html>"#,
        styles = page_styles(),
    )
}

fn generate_provider_buttons(settings: &DaringSettings) -> String {
    settings
        .identity
        .providers
        .iter()
        .map(|provider| {
            let name = escape_html(provider);
            format!(
                r#"<a href="{sign_in}?provider={name}" class="provider-button provider-{name}">
                    <span>Continue with {display}</span>
                </a>"#,
                sign_in = escape_html(&settings.routes.sign_in_path),
                display = escape_html(&capitalize(provider)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n                ")
}

/// Callback page: shows a loading indicator while the server resolves the
/// URL it was loaded at, then follows the decision
///
/// The fragment never reaches the server on a plain GET, so the page posts
/// `window.location.href` back and performs the returned navigation itself.
#[must_use]
pub fn generate_callback_page(settings: &DaringSettings) -> String {
    let callback_path = escape_html(&settings.routes.callback_path);
    let sign_in_path = escape_html(&settings.routes.sign_in_path);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Signing you in - Daring Different</title>
    <style>{styles}</style>
</head>
<body>
    <div class="container">
        <div class="card">
            <div id="loading">
                <div class="spinner" aria-hidden="true"></div>
                <p>Completing sign-in...</p>
            </div>
            <div id="failure" hidden>
                <h1>Authentication Error</h1>
                <div class="error" role="alert" id="failure-message"></div>
                <button type="button" class="provider-button" id="retry">Return to Sign In</button>
            </div>
        </div>
    </div>
    <script>
        (function () {{
            var retryPath = "{sign_in_path}";
            function follow(decision) {{
                var target = new URL(decision.destination, window.location.origin);
                if (decision.state) {{
                    sessionStorage.setItem("navigationState", JSON.stringify(decision.state));
                }}
                if (decision.replace) {{
                    window.location.replace(target.href);
                }} else {{
                    window.location.assign(target.href);
                }}
            }}
            function fail(message, retry) {{
                document.getElementById("loading").hidden = true;
                document.getElementById("failure").hidden = false;
                document.getElementById("failure-message").textContent = message;
                document.getElementById("retry").onclick = function () {{
                    window.location.assign(retry || retryPath);
                }};
            }}
            fetch("{callback_path}", {{
                method: "POST",
                credentials: "same-origin",
                headers: {{ "Content-Type": "application/json" }},
                body: JSON.stringify({{ url: window.location.href }})
            }})
                .then(function (res) {{ return res.json(); }})
                .then(function (decision) {{
                    if (decision.status === "redirect") {{
                        follow(decision);
                    }} else {{
                        fail(decision.message || "An error occurred during authentication", decision.retry);
                    }}
                }})
                .catch(function () {{
                    fail("An error occurred during authentication", retryPath);
                }});
        }})();
    </script>
</body>
</html>"#,
        styles = page_styles(),
    )
}

#[allow(clippy::too_many_lines)]
const fn page_styles() -> &'static str {
    r"
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
            background: #faf7f2;
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            padding: 20px;
        }

        .container {
            width: 100%;
            max-width: 400px;
        }

        .card {
            background: white;
            border-radius: 10px;
            box-shadow: 0 14px 28px rgba(0,0,0,0.12), 0 10px 10px rgba(0,0,0,0.08);
            padding: 40px;
            text-align: center;
        }

        h1 {
            color: #222;
            font-size: 28px;
            font-weight: 600;
            margin-bottom: 10px;
        }

        p {
            color: #666;
            margin-bottom: 30px;
        }

        .error {
            background: #fdecea;
            color: #b3261e;
            border-radius: 6px;
            padding: 12px;
            margin-bottom: 20px;
        }

        .button-container {
            display: flex;
            flex-direction: column;
            gap: 15px;
        }

        .provider-button {
            display: flex;
            align-items: center;
            justify-content: center;
            width: 100%;
            padding: 12px 20px;
            border: none;
            border-radius: 6px;
            background: #e4572e;
            color: white;
            text-decoration: none;
            font-weight: 500;
            font-size: 16px;
            cursor: pointer;
        }

        .provider-google {
            background: #4285f4;
        }

        .spinner {
            width: 40px;
            height: 40px;
            margin: 0 auto 20px;
            border: 4px solid #eee;
            border-top-color: #e4572e;
            border-radius: 50%;
            animation: spin 1s linear infinite;
        }

        @keyframes spin {
            to { transform: rotate(360deg); }
        }
    "
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_page_lists_providers_and_escapes_error() {
        let mut settings = DaringSettings::default();
        settings.identity.providers = vec!["google".to_string(), "github".to_string()];

        let page = generate_sign_in_page(&settings, Some("<b>expired</b>"));
        assert!(page.contains(r#"href="/auth/sign_in?provider=google""#));
        assert!(page.contains("Continue with Github"));
        assert!(page.contains("&lt;b&gt;expired&lt;/b&gt;"));
        assert!(!page.contains("<b>expired</b>"));
    }

    #[test]
    fn test_sign_in_page_without_error() {
        let page = generate_sign_in_page(&DaringSettings::default(), None);
        assert!(!page.contains(r#"class="error""#));
    }

    #[test]
    fn test_callback_page_posts_current_url() {
        let page = generate_callback_page(&DaringSettings::default());
        assert!(page.contains("Completing sign-in"));
        assert!(page.contains(r#"fetch("/auth/callback""#));
        assert!(page.contains("window.location.href"));
        assert!(page.contains(r#"var retryPath = "/auth/sign_in";"#));
    }
}
