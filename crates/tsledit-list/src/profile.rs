#![forbid(unsafe_code)]

//! Country and provider profiles: the fixed content a scheme operator puts in
//! every edition of its list.

use crate::lang::LangStrings;
use crate::list::TrustList;
use crate::provider::{PostalAddress, TrustServiceProvider};
use crate::service::{qualifier, TrustService};
use time::{Date, Month, OffsetDateTime};
use tsledit_core::Error;

/// Scheme information of one country's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryProfile {
    pub territory: String,
    pub operator_names: LangStrings,
    pub operator_postal_addresses: Vec<PostalAddress>,
    pub operator_electronic_addresses: Vec<String>,
    pub scheme_names: LangStrings,
    pub scheme_information_uris: LangStrings,
    pub status_determination_approach: String,
    pub scheme_types: Vec<String>,
    pub legal_notices: LangStrings,
    /// In days.
    pub historical_information_period: u32,
    pub distribution_points: Vec<String>,
    /// Months between issue and next update.
    pub next_update_months: u32,
    pub providers: Vec<ProviderProfile>,
}

/// A trust service provider with the services it is expected to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub names: LangStrings,
    pub postal_addresses: Vec<PostalAddress>,
    pub electronic_addresses: Vec<String>,
    pub information_uris: LangStrings,
    pub services: Vec<ServiceProfile>,
}

/// A root CA service: its certificate is supplied at build time, the
/// qualified-certificate policies are fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceProfile {
    pub label: String,
    /// `(oid, description)` pairs qualified as QCNoSSCD.
    pub qc_no_sscd_policies: Vec<(String, String)>,
}

impl ServiceProfile {
    /// Build the service from its CA certificate(s).
    pub fn build(&self, certificates: &[Vec<u8>]) -> Result<TrustService, Error> {
        let mut service = TrustService::from_certificates(certificates)?;
        for (oid, description) in &self.qc_no_sscd_policies {
            service.add_qualification(qualifier::QC_NO_SSCD, oid, Some(description));
        }
        Ok(service)
    }
}

impl ProviderProfile {
    /// The provider entry without services.
    pub fn to_provider(&self) -> TrustServiceProvider {
        TrustServiceProvider {
            name: self.names.clone(),
            postal_addresses: self.postal_addresses.clone(),
            electronic_addresses: self.electronic_addresses.clone(),
            information_uris: self.information_uris.clone(),
            ..TrustServiceProvider::default()
        }
    }

    /// Certipost, operator of the Belgian eID root CAs.
    pub fn certipost() -> Self {
        let mut names = LangStrings::new();
        names.set("en", "Certipost");
        let mut information_uris = LangStrings::new();
        information_uris.add("en", "http://www.certipost.be");
        let policies = |citizen: &str, foreigner: &str| {
            vec![
                (citizen.to_owned(), "Citizen".to_owned()),
                (foreigner.to_owned(), "Foreigner".to_owned()),
            ]
        };
        Self {
            names,
            postal_addresses: vec![PostalAddress::new(
                "en",
                "Ninovesteenweg 196",
                "EREMBODEGEM",
                Some("Oost-Vlaanderen"),
                Some("9320"),
                "BE",
            )],
            electronic_addresses: vec![
                "http://www.certipost.be/".to_owned(),
                "mailto:eid.csp@staff.certipost.be".to_owned(),
            ],
            information_uris,
            services: vec![
                ServiceProfile {
                    label: "Belgium Root CA".to_owned(),
                    qc_no_sscd_policies: policies("2.16.56.1.1.1.2.1", "2.16.56.1.1.1.7.1"),
                },
                ServiceProfile {
                    label: "Belgium Root CA2".to_owned(),
                    qc_no_sscd_policies: policies("2.16.56.9.1.1.2.1", "2.16.56.9.1.1.7.1"),
                },
            ],
        }
    }
}

impl CountryProfile {
    /// The Belgian list operated by Fedict.
    pub fn belgium() -> Self {
        let mut operator_names = LangStrings::new();
        for lang in ["en", "nl", "fr", "de"] {
            operator_names.set(lang, "Fedict");
        }
        let mut scheme_names = LangStrings::new();
        scheme_names.set(
            "en",
            "BE:Supervision/Accreditation Status List of certification services from Certification Service Providers, which are supervised/accredited by the referenced Scheme Operator Member State for compliance with the relevant provisions laid down in  Directive 1999/93/EC of the European Parliament and of the Council of 13 December 1999 on a Community framework for electronic signatures",
        );
        let mut scheme_information_uris = LangStrings::new();
        scheme_information_uris.add("en", "http://tsl.belgium.be/");
        scheme_information_uris.add("nl", "http://tsl.belgium.be/nl/");
        scheme_information_uris.add("fr", "http://tsl.belgium.be/fr/");
        let mut legal_notices = LangStrings::new();
        legal_notices.add(
            "en",
            "The applicable legal framework for the present TSL implementation of the Trusted List of supervised/accredited Certification Service Providers for Belgium is the Directive 1999/93/EC of the European Parliament and of the Council of 13 December 1999 on a Community framework for electronic signatures and its implementation in Belgian laws. The applicable legal national framework is the Wet van 9 juli 2001 houdende vaststelling van bepaalde regels in verband met het juridisch kader voor elektronische handtekeningen en certificatiediensten.",
        );

        Self {
            territory: "BE".to_owned(),
            operator_names,
            operator_postal_addresses: vec![
                PostalAddress::new(
                    "en",
                    "Maria-Theresiastraat 1/3",
                    "Brussels",
                    Some("Brussels"),
                    Some("1000"),
                    "Belgium",
                ),
                PostalAddress::new(
                    "nl",
                    "Maria-Theresiastraat 1/3",
                    "Brussel",
                    Some("Brussel"),
                    Some("1000"),
                    "België",
                ),
            ],
            operator_electronic_addresses: vec![
                "http://www.fedict.belgium.be/".to_owned(),
                "mailto://eid@belgium.be".to_owned(),
            ],
            scheme_names,
            scheme_information_uris,
            status_determination_approach:
                "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/StatusDetn/appropriate"
                    .to_owned(),
            scheme_types: vec![
                "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/schemerules/common"
                    .to_owned(),
                "http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/schemerules/BE"
                    .to_owned(),
            ],
            legal_notices,
            // Thirty years of records for qualified certificates (Belgian
            // e-signature law of 9 July 2001, annex II).
            historical_information_period: 3653 * 3,
            distribution_points: vec!["http://tsl.belgium.be/tsl-be.xml".to_owned()],
            next_update_months: 6,
            providers: vec![ProviderProfile::certipost()],
        }
    }

    /// Write the scheme information into `list`, issued at `issued`, and
    /// append the profile's providers (without services).
    pub fn apply(&self, list: &mut TrustList, issued: OffsetDateTime) -> Result<(), Error> {
        for name in self.operator_names.iter() {
            list.set_scheme_operator_name(&name.lang, &name.value);
        }
        for address in &self.operator_postal_addresses {
            list.set_scheme_operator_postal_address(address.clone());
        }
        list.set_scheme_operator_electronic_addresses(self.operator_electronic_addresses.iter().cloned());
        for name in self.scheme_names.iter() {
            list.set_scheme_name(&name.lang, &name.value);
        }
        for uri in self.scheme_information_uris.iter() {
            list.add_scheme_information_uri(&uri.lang, &uri.value);
        }
        list.set_status_determination_approach(&self.status_determination_approach);
        for scheme_type in &self.scheme_types {
            list.add_scheme_type(scheme_type);
        }
        list.set_scheme_territory(&self.territory);
        for notice in self.legal_notices.iter() {
            list.add_legal_notice(&notice.lang, &notice.value);
        }
        list.set_historical_information_period(self.historical_information_period);
        list.set_list_issue_date_time(issued);
        list.set_next_update(add_months(issued, self.next_update_months)?);
        for point in &self.distribution_points {
            list.add_distribution_point(point);
        }
        for provider in &self.providers {
            list.add_trust_service_provider(provider.to_provider());
        }
        log::debug!("applied {} profile", self.territory);
        Ok(())
    }
}

/// Calendar month arithmetic; the day is clamped to the target month.
fn add_months(t: OffsetDateTime, months: u32) -> Result<OffsetDateTime, Error> {
    let total = t.year() * 12 + i32::from(u8::from(t.month())) - 1 + months as i32;
    let year = total.div_euclid(12);
    let month = Month::try_from((total.rem_euclid(12) + 1) as u8)
        .map_err(|e| Error::Other(format!("invalid month: {e}")))?;
    let day = t.day().min(time::util::days_in_year_month(year, month));
    let date = Date::from_calendar_date(year, month, day)
        .map_err(|e| Error::Other(format!("invalid date: {e}")))?;
    Ok(t.replace_date(date))
}
