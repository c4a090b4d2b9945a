//! Message rendering for the status and startup slots.

use crate::lifecycle::domain::{
    ProbeErrorKind, ServerEndpoint, ServerSnapshot, StartupBanner, StartupView,
};
use minijinja::{Environment, context};
use thiserror::Error;

const STARTUP_TEMPLATE_NAME: &str = "startup";
const STATUS_TEMPLATE_NAME: &str = "status";

const STARTUP_TEMPLATE: &str = "🟢 The server is up
```
IP: {{ host }}
Port: {{ port }}
{% if password %}Password: {{ password }}
{% endif %}```
{% if countdown %}⏰ Join within {{ countdown }} seconds
{% endif %}👥 Players online: {{ players }}
{%- if joined %}

✅ A player has joined!
{%- elif warning_secs is not none %}

⚠️ The server will stop unless someone joins within {{ warning_secs }} seconds
{%- endif %}";

const STATUS_TEMPLATE: &str = "{% if error == 'unreachable' %}Server: offline
Status: stopped
{%- elif error == 'parse_failure' %}Server: error
Status: status check failed
{%- else %}Online: {{ players }} players
Ping: {% if ping is not none %}{{ ping }}ms{% else %}n/a{% endif %}
Version: {{ version or 'unknown' }}
{%- endif %}";

/// Errors raised while rendering slot content.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// A template failed to compile or render.
    #[error("failed to render {template} message: {reason}")]
    Template {
        /// Template name.
        template: &'static str,
        /// Engine diagnostic.
        reason: String,
    },
}

/// Renders slot content from domain views.
#[derive(Debug)]
pub struct MessageRenderer {
    environment: Environment<'static>,
    endpoint: ServerEndpoint,
}

impl MessageRenderer {
    /// Compiles the message templates for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if a template fails to compile.
    pub fn new(endpoint: ServerEndpoint) -> Result<Self, RenderError> {
        let mut environment = Environment::new();
        environment
            .add_template(STARTUP_TEMPLATE_NAME, STARTUP_TEMPLATE)
            .map_err(|err| template_error(STARTUP_TEMPLATE_NAME, &err))?;
        environment
            .add_template(STATUS_TEMPLATE_NAME, STATUS_TEMPLATE)
            .map_err(|err| template_error(STATUS_TEMPLATE_NAME, &err))?;
        Ok(Self {
            environment,
            endpoint,
        })
    }

    /// Renders the startup slot.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if rendering fails.
    pub fn startup(&self, view: &StartupView) -> Result<String, RenderError> {
        let warning_secs = match view.banner {
            Some(StartupBanner::EmptyWarning { remaining }) => Some(remaining.as_secs()),
            _ => None,
        };
        let countdown = view.countdown_secs.filter(|secs| *secs > 0);
        self.render(
            STARTUP_TEMPLATE_NAME,
            context! {
                host => self.endpoint.host(),
                port => self.endpoint.port(),
                password => self.endpoint.password(),
                countdown => countdown,
                players => view.player_count,
                joined => matches!(view.banner, Some(StartupBanner::PlayerJoined)),
                warning_secs => warning_secs,
            },
        )
    }

    /// Renders the status slot from the latest probe.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if rendering fails.
    pub fn status(&self, snapshot: &ServerSnapshot) -> Result<String, RenderError> {
        let error = match snapshot.error_kind() {
            ProbeErrorKind::None => None,
            ProbeErrorKind::Unreachable => Some("unreachable"),
            ProbeErrorKind::ParseFailure => Some("parse_failure"),
        };
        self.render(
            STATUS_TEMPLATE_NAME,
            context! {
                error => error,
                players => snapshot.player_count(),
                ping => snapshot.ping_ms(),
                version => snapshot.version(),
            },
        )
    }

    fn render(&self, name: &'static str, ctx: minijinja::Value) -> Result<String, RenderError> {
        self.environment
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|err| template_error(name, &err))
    }
}

fn template_error(template: &'static str, err: &minijinja::Error) -> RenderError {
    RenderError::Template {
        template,
        reason: err.to_string(),
    }
}
