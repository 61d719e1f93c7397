#![forbid(unsafe_code)]

//! Trust service providers and postal addresses.

use crate::lang::LangStrings;
use crate::service::TrustService;

/// A `PostalAddress` in one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalAddress {
    pub lang: String,
    pub street_address: String,
    pub locality: String,
    pub state_or_province: Option<String>,
    pub postal_code: Option<String>,
    pub country_name: String,
}

impl PostalAddress {
    pub fn new(
        lang: &str,
        street_address: &str,
        locality: &str,
        state_or_province: Option<&str>,
        postal_code: Option<&str>,
        country_name: &str,
    ) -> Self {
        Self {
            lang: lang.to_ascii_uppercase(),
            street_address: street_address.to_owned(),
            locality: locality.to_owned(),
            state_or_province: state_or_province.map(str::to_owned),
            postal_code: postal_code.map(str::to_owned),
            country_name: country_name.to_owned(),
        }
    }
}

/// Find the address for `lang` (case-insensitive, no fallback).
pub(crate) fn address_for<'a>(addresses: &'a [PostalAddress], lang: &str) -> Option<&'a PostalAddress> {
    addresses.iter().find(|a| a.lang.eq_ignore_ascii_case(lang))
}

/// Insert or replace the address for the address's own language.
pub(crate) fn set_address(addresses: &mut Vec<PostalAddress>, address: PostalAddress) {
    match addresses
        .iter_mut()
        .find(|a| a.lang.eq_ignore_ascii_case(&address.lang))
    {
        Some(existing) => *existing = address,
        None => addresses.push(address),
    }
}

/// A `TrustServiceProvider` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustServiceProvider {
    pub name: LangStrings,
    pub trade_name: LangStrings,
    pub postal_addresses: Vec<PostalAddress>,
    pub electronic_addresses: Vec<String>,
    pub information_uris: LangStrings,
    pub services: Vec<TrustService>,
}

impl TrustServiceProvider {
    /// A provider with an English name.
    pub fn new(name: &str) -> Self {
        let mut provider = Self::default();
        provider.name.set("en", name);
        provider
    }

    pub fn name(&self, lang: &str) -> Option<&str> {
        self.name.get(lang)
    }

    /// Adds or replaces the address in the address's language.
    pub fn add_postal_address(&mut self, address: PostalAddress) {
        set_address(&mut self.postal_addresses, address);
    }

    pub fn postal_address(&self, lang: &str) -> Option<&PostalAddress> {
        address_for(&self.postal_addresses, lang)
    }

    pub fn add_electronic_address<I, S>(&mut self, uris: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.electronic_addresses
            .extend(uris.into_iter().map(Into::into));
    }

    pub fn add_information_uri(&mut self, lang: &str, uri: &str) {
        self.information_uris.add(lang, uri);
    }

    pub fn information_uri(&self, lang: &str) -> Option<&str> {
        self.information_uris.find(lang)
    }

    pub fn add_trust_service(&mut self, service: TrustService) {
        self.services.push(service);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{service_type, status};

    #[test]
    fn addresses_are_per_language() {
        let mut tsp = TrustServiceProvider::new("Certipost");
        tsp.add_postal_address(PostalAddress::new(
            "en",
            "Ninovesteenweg 196",
            "EREMBODEGEM",
            Some("Oost-Vlaanderen"),
            Some("9320"),
            "BE",
        ));
        assert_eq!(tsp.postal_address("EN").unwrap().locality, "EREMBODEGEM");
        assert_eq!(tsp.postal_address("en").unwrap().lang, "EN");
        assert!(tsp.postal_address("nl").is_none());

        tsp.add_postal_address(PostalAddress::new("en", "Elsewhere 1", "Gent", None, None, "BE"));
        assert_eq!(tsp.postal_addresses.len(), 1);
        assert_eq!(tsp.postal_address("en").unwrap().locality, "Gent");
    }

    #[test]
    fn uris_and_services() {
        let mut tsp = TrustServiceProvider::new("Certipost");
        tsp.add_electronic_address(["http://www.certipost.be/", "mailto:eid.csp@staff.certipost.be"]);
        tsp.add_information_uri("en", "http://www.certipost.be");
        tsp.add_trust_service(TrustService::new("Root", service_type::CA_QC, status::UNDER_SUPERVISION));

        assert_eq!(tsp.electronic_addresses.len(), 2);
        assert_eq!(tsp.information_uri("EN"), Some("http://www.certipost.be"));
        assert_eq!(tsp.information_uri("fr"), None);
        assert_eq!(tsp.name("de"), Some("Certipost"));
        assert_eq!(tsp.services.len(), 1);
    }
}
