use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

/// same-origin cookie store shared by the transport (which keeps it current
/// from `Set-Cookie`) and the token providers (which read it per request).
#[derive(Clone, Default, Debug)]
pub(crate) struct CookieJar {
    inner: Arc<RwLock<BTreeMap<String, String>>>,
}

impl CookieJar {
    /// `document.cookie` format: `a=1; b=2`. first occurrence of a name wins.
    pub(crate) fn parse(cookies: &str) -> Self {
        let mut map = BTreeMap::new();
        for pair in cookies.split(';') {
            if let Some((name, value)) = split_pair(pair) {
                map.entry(name).or_insert(value);
            }
        }
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// percent-decoded value; undecodable values come back raw.
    pub(crate) fn get(&self, name: &str) -> Option<String> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let raw = map.get(name)?;
        match urlencoding::decode(raw) {
            Ok(value) => Some(value.into_owned()),
            Err(_) => Some(raw.clone()),
        }
    }

    pub(crate) fn set<K: Into<String>, V: Into<String>>(&self, name: K, value: V) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert(name.into(), value.into());
    }

    /// takes the leading `name=value` of a `Set-Cookie` header, attributes
    /// are ignored.
    pub(crate) fn absorb_set_cookie(&self, header: &str) {
        let pair = header.split(';').next().unwrap_or_default();
        if let Some((name, value)) = split_pair(pair) {
            log::debug!("cookie {} rotated.", name);
            self.set(name, value);
        }
    }

    pub(crate) fn header(&self) -> Option<String> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        if map.is_empty() {
            return None;
        }
        let pairs: Vec<String> = map.iter().map(|(name, value)| format!("{}={}", name, value)).collect();
        Some(pairs.join("; "))
    }
}

fn split_pair(pair: &str) -> Option<(String, String)> {
    let pair = pair.trim();
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_owned(), value.trim().to_owned()))
}

/// source of the anti-forgery token, asked again for every request.
pub(crate) trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

pub(crate) struct CookieToken {
    jar: CookieJar,
    name: String,
}

impl CookieToken {
    pub(crate) fn new<T: Into<String>>(jar: CookieJar, name: T) -> Self {
        Self { jar, name: name.into() }
    }
}

impl TokenProvider for CookieToken {
    fn token(&self) -> Option<String> {
        self.jar.get(&self.name).filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{CookieJar, CookieToken, TokenProvider};

    #[test]
    fn parse_trims_and_decodes() {
        let jar = CookieJar::parse(" sessionid=abc ;csrftoken=a%2Fb%3D; theme=dark");
        assert_eq!(jar.get("csrftoken"), Some("a/b=".to_string()));
        assert_eq!(jar.get("sessionid"), Some("abc".to_string()));
        assert_eq!(jar.get("missing"), None);
    }

    #[test]
    fn first_occurrence_wins() {
        let jar = CookieJar::parse("csrftoken=one; csrftoken=two");
        assert_eq!(jar.get("csrftoken"), Some("one".to_string()));
    }

    #[test]
    fn garbage_pairs_are_skipped() {
        let jar = CookieJar::parse("novalue; =x; ok=1;;");
        assert_eq!(jar.header(), Some("ok=1".to_string()));
    }

    #[test]
    fn provider_sees_rotation() {
        let jar = CookieJar::parse("csrftoken=old");
        let provider = CookieToken::new(jar.clone(), "csrftoken");
        assert_eq!(provider.token(), Some("old".to_string()));
        jar.absorb_set_cookie("csrftoken=new; Path=/; SameSite=Lax");
        assert_eq!(provider.token(), Some("new".to_string()));
    }

    #[test]
    fn empty_token_is_missing() {
        let provider = CookieToken::new(CookieJar::parse("csrftoken="), "csrftoken");
        assert_eq!(provider.token(), None);
        let provider = CookieToken::new(CookieJar::default(), "csrftoken");
        assert_eq!(provider.token(), None);
    }
}
