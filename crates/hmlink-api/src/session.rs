// Session lifecycle
//
// `Session.login` issues an opaque token that the client attaches to every
// later call. The CCU expires idle sessions after a few minutes, so a
// background task renews the token on a fixed cadence until the owning
// `Session` is closed or dropped.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{Params, RpcClient, params};
use crate::error::Error;

/// How often the session is renewed unless configured otherwise.
pub const DEFAULT_RENEW_INTERVAL: Duration = Duration::from_secs(60);

impl RpcClient {
    /// Authenticate with username/password and cache the issued token.
    ///
    /// A hub-side rejection or an empty token is reported as
    /// [`Error::Authentication`]; transport failures pass through unchanged.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        debug!(username, "logging in");

        let body = params([
            ("username", username),
            ("password", password.expose_secret()),
        ]);

        let token: Option<String> = match self.call("Session.login", body).await {
            Ok(token) => token,
            Err(Error::Rpc { message, .. }) => return Err(Error::Authentication { message }),
            Err(e) => return Err(e),
        };

        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| Error::Authentication {
            message: "hub did not issue a session token".into(),
        })?;

        self.store_session(Some(SecretString::from(token)));
        debug!("login successful");
        Ok(())
    }

    /// Extend the lifetime of the current session.
    pub async fn renew(&self) -> Result<bool, Error> {
        self.call("Session.renew", Params::new()).await
    }

    /// End the current session and forget the token.
    pub async fn logout(&self) -> Result<(), Error> {
        debug!("logging out");
        let _: serde_json::Value = self.call("Session.logout", Params::new()).await?;
        self.store_session(None);
        debug!("logout complete");
        Ok(())
    }
}

/// An authenticated session with a running renewal task.
///
/// The renewal task is bound to a child of the caller's cancellation token,
/// so shutting down the caller's scope stops it as well. Prefer
/// [`close`](Self::close), which also logs out.
#[derive(Debug)]
pub struct Session {
    client: Arc<RpcClient>,
    cancel: CancellationToken,
    renewal: Option<JoinHandle<()>>,
}

impl Session {
    /// Log in and spawn the renewal task.
    ///
    /// A zero `renew_every` is rejected with [`Error::Config`] before any
    /// request is sent.
    pub async fn start(
        client: Arc<RpcClient>,
        username: &str,
        password: &SecretString,
        renew_every: Duration,
        cancel: &CancellationToken,
    ) -> Result<Self, Error> {
        if renew_every.is_zero() {
            return Err(Error::Config("session renewal interval must be non-zero".into()));
        }
        client.login(username, password).await?;
        info!(endpoint = %client.endpoint(), "session established");

        let cancel = cancel.child_token();
        let renewal = tokio::spawn(renewal_task(
            Arc::clone(&client),
            renew_every,
            cancel.clone(),
        ));

        Ok(Self {
            client,
            cancel,
            renewal: Some(renewal),
        })
    }

    /// The client this session authenticates.
    pub fn client(&self) -> &Arc<RpcClient> {
        &self.client
    }

    /// Stop renewing, wait for the renewal task, then log out.
    pub async fn close(mut self) -> Result<(), Error> {
        self.cancel.cancel();
        if let Some(handle) = self.renewal.take() {
            let _ = handle.await;
        }
        self.client.logout().await
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Renew the session every `period` until cancelled.
///
/// Failures are logged and the loop keeps going. The cached token is left
/// untouched.
async fn renewal_task(client: Arc<RpcClient>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match client.renew().await {
                    Ok(true) => debug!("session renewed"),
                    Ok(false) => warn!("session renewal rejected by hub"),
                    Err(e) => warn!(error = %e, "session renewal failed"),
                }
            }
        }
    }
    debug!("session renewal stopped");
}
