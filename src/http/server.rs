use log::{info, warn};
use rouille::{Request, Response, input::post::raw_urlencoded_post_input};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    auth::OAuthClient,
    config::HttpConfig,
    domain::{moves::Move, track::Playlist},
    http::error::ApiError,
    library::{Library, error::LibraryError},
    remote::Connector,
    session::{self, Token, TokenStore},
};

/// Cookie holding the opaque visitor id.
const SESSION_COOKIE: &str = "sid";
const SESSION_TTL_SECS: u64 = 30 * 24 * 3600;

pub struct HttpServer<C> {
    tokens: Arc<Mutex<TokenStore>>,
    oauth: OAuthClient,
    connector: C,
    pub config: HttpConfig,
}

impl<C> HttpServer<C>
where
    C: Connector + Send + Sync + 'static,
{
    pub fn new(tokens: TokenStore, oauth: OAuthClient, connector: C, config: HttpConfig) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(tokens)),
            oauth,
            connector,
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let response =
            rouille::session::session(request, SESSION_COOKIE, SESSION_TTL_SECS, |visit| {
                let sid = visit.id();
                let result = rouille::router!(request,
                    (GET) (/) => {
                        self.handle_home(request, sid)
                    },
                    (GET) (/sign_out) => {
                        self.handle_sign_out(sid)
                    },
                    (GET) (/playlists) => {
                        self.handle_playlists(sid)
                    },
                    (GET) (/playlist/{id: String}) => {
                        self.handle_playlist(sid, &id)
                    },
                    (POST) (/change_order) => {
                        self.handle_change_order(request, sid)
                    },
                    _ => Ok(Response::empty_404())
                );
                self.respond(sid, result)
            });

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn respond(&self, sid: &str, result: Result<Response, ApiError>) -> Response {
        match result {
            Ok(response) => response,
            Err(ApiError::Unauthenticated) => {
                // the remote refused the cached token, do not offer it again
                if let Err(e) = self.tokens().and_then(|t| Ok(t.forget(sid)?)) {
                    warn!("could not drop refused token: {e}");
                }
                ApiError::Unauthenticated.into_response()
            }
            Err(e) => e.into_response(),
        }
    }

    fn tokens(&self) -> Result<MutexGuard<'_, TokenStore>, ApiError> {
        self.tokens
            .lock()
            .map_err(|e| ApiError::Internal(format!("token store unavailable: {e}")))
    }

    fn valid_token(&self, sid: &str) -> Result<Option<Token>, ApiError> {
        Ok(self.tokens()?.valid_token(sid, session::now())?)
    }

    /// Library bound to the visitor's credential, for this request only.
    fn library(&self, sid: &str) -> Result<Library<C::Service>, ApiError> {
        let token = self.valid_token(sid)?.ok_or(ApiError::Unauthenticated)?;
        Ok(Library::new(self.connector.connect(&token.access_token)))
    }

    /// Sign-in page, and landing point of the authorization callback.
    fn handle_home(&self, request: &Request, sid: &str) -> Result<Response, ApiError> {
        if let Some(error) = request.get_param("error") {
            return Err(ApiError::BadRequest(format!("sign-in was refused: {error}")));
        }

        if let Some(code) = request.get_param("code") {
            let state = request.get_param("state").unwrap_or_default();
            self.oauth.verify_state(sid, &state)?;
            let token = self.oauth.exchange_code(&code, session::now())?;
            self.tokens()?.save(sid, &token)?;
            info!("visitor signed in, token valid until {}", token.expires_at);
            return Ok(Response::redirect_303("/"));
        }

        if self.valid_token(sid)?.is_some() {
            return Ok(Response::redirect_303("/playlists"));
        }

        Ok(Response::json(&HomeResponse {
            auth_url: self.oauth.authorize_url(sid),
        }))
    }

    fn handle_sign_out(&self, sid: &str) -> Result<Response, ApiError> {
        if !self.tokens()?.forget(sid)? {
            warn!("sign out of a visitor without token");
        }
        Ok(Response::redirect_303("/"))
    }

    fn handle_playlists(&self, sid: &str) -> Result<Response, ApiError> {
        let library = self.library(sid)?;
        let me = library.identity()?;
        let playlists = library.list_owned_playlists(me)?;

        Ok(Response::json(&PlaylistsResponse {
            name: me.name.clone(),
            playlists,
        }))
    }

    fn handle_playlist(&self, sid: &str, id: &str) -> Result<Response, ApiError> {
        let library = self.library(sid)?;
        let me = library.identity()?;
        let playlist = library.playlist_detail(me, id)?;

        Ok(Response::json(&playlist))
    }

    /// Form body: `playlist=<id>` and any number of `moves[]=<src>-<dst>`.
    fn handle_change_order(&self, request: &Request, sid: &str) -> Result<Response, ApiError> {
        let library = self.library(sid)?;

        let form = raw_urlencoded_post_input(request)
            .map_err(|e| ApiError::BadRequest(format!("invalid form: {e}")))?;

        let playlist_id = form
            .iter()
            .find(|(key, _)| key == "playlist")
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ApiError::BadRequest("missing playlist".into()))?;
        let raw_moves: Vec<&str> = form
            .iter()
            .filter(|(key, _)| key == "moves[]" || key == "moves")
            .map(|(_, value)| value.as_str())
            .collect();
        let moves = Move::parse_batch(&raw_moves).map_err(LibraryError::from)?;

        let me = library.identity()?;
        let applied = library.apply_moves(me, &playlist_id, &moves)?;

        Ok(Response::json(&ChangeOrderResponse { applied }))
    }
}

#[derive(Serialize, Deserialize)]
struct HomeResponse {
    auth_url: String,
}

#[derive(Serialize)]
struct PlaylistsResponse {
    name: String,
    playlists: Vec<Playlist>,
}

#[derive(Serialize, Deserialize)]
struct ChangeOrderResponse {
    applied: usize,
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
