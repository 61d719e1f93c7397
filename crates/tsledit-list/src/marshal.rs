#![forbid(unsafe_code)]

//! Model to XML. Every marshal assigns a fresh root `Id`.

use crate::element::{self as el, attr};
use crate::lang::LangStrings;
use crate::list::{TrustList, TSL_TAG, VERSION_IDENTIFIER};
use crate::provider::{PostalAddress, TrustServiceProvider};
use crate::list::OtherTslPointer;
use crate::service::{DigitalIdentity, Qualification, ServiceHistoryInstance, TrustService};
use base64::Engine;
use time::OffsetDateTime;
use tsledit_core::{ns, Error};
use tsledit_xml::{datetime, XmlWriter};

const XML_LANG: &str = "xml:lang";

fn tsl(local: &str) -> String {
    format!("{}:{local}", ns::prefix::TSL)
}

fn ecc(local: &str) -> String {
    format!("{}:{local}", ns::prefix::ECC)
}

fn xades(local: &str) -> String {
    format!("{}:{local}", ns::prefix::XADES)
}

/// A root `Id` value not used before.
pub(crate) fn fresh_id() -> String {
    format!("tsl-{}", uuid::Uuid::new_v4())
}

/// Serialize `list`, returning the new root id and the document.
pub(crate) fn marshal(list: &TrustList) -> Result<(String, String), Error> {
    let id = fresh_id();
    log::debug!("marshalling trust list as {id}");

    let mut w = XmlWriter::new();
    let root = tsl(el::TRUST_SERVICE_STATUS_LIST);
    w.start_element(
        &root,
        &[
            ("xmlns:tsl", ns::TSL),
            ("xmlns:ds", ns::DSIG),
            ("xmlns:ecc", ns::ECC),
            ("xmlns:xades", ns::XADES),
            (attr::ID, id.as_str()),
            (attr::TSL_TAG, TSL_TAG),
        ],
    )?;
    write_scheme_information(&mut w, list)?;
    if !list.providers.is_empty() {
        let name = tsl(el::TRUST_SERVICE_PROVIDER_LIST);
        w.start_element(&name, &[])?;
        for provider in &list.providers {
            write_provider(&mut w, provider)?;
        }
        w.end_element(&name)?;
    }
    w.end_element(&root)?;
    Ok((id, w.into_string()?))
}

fn write_scheme_information(w: &mut XmlWriter, list: &TrustList) -> Result<(), Error> {
    let name = tsl(el::SCHEME_INFORMATION);
    w.start_element(&name, &[])?;
    text(w, el::TSL_VERSION_IDENTIFIER, &VERSION_IDENTIFIER.to_string())?;
    text(w, el::TSL_SEQUENCE_NUMBER, &list.sequence_number.to_string())?;
    text(w, el::TSL_TYPE, &list.tsl_type)?;
    names(w, el::SCHEME_OPERATOR_NAME, &list.scheme_operator_name)?;
    address(
        w,
        el::SCHEME_OPERATOR_ADDRESS,
        &list.scheme_operator_postal_addresses,
        &list.scheme_operator_electronic_addresses,
    )?;
    names(w, el::SCHEME_NAME, &list.scheme_name)?;
    lang_uris(w, el::SCHEME_INFORMATION_URI, &list.scheme_information_uris)?;
    if let Some(approach) = &list.status_determination_approach {
        text(w, el::STATUS_DETERMINATION_APPROACH, approach)?;
    }
    uris(w, el::SCHEME_TYPE_COMMUNITY_RULES, &list.scheme_types)?;
    if let Some(territory) = &list.scheme_territory {
        text(w, el::SCHEME_TERRITORY, territory)?;
    }
    if !list.legal_notices.is_empty() {
        let notices = tsl(el::POLICY_OR_LEGAL_NOTICE);
        w.start_element(&notices, &[])?;
        for notice in list.legal_notices.iter() {
            w.text_element(&tsl(el::TSL_LEGAL_NOTICE), &[(XML_LANG, notice.lang.as_str())], &notice.value)?;
        }
        w.end_element(&notices)?;
    }
    if let Some(days) = list.historical_information_period {
        text(w, el::HISTORICAL_INFORMATION_PERIOD, &days.to_string())?;
    }
    if !list.other_tsl_pointers.is_empty() {
        let pointers = tsl(el::POINTERS_TO_OTHER_TSL);
        w.start_element(&pointers, &[])?;
        for pointer in &list.other_tsl_pointers {
            write_pointer(w, pointer)?;
        }
        w.end_element(&pointers)?;
    }
    if let Some(t) = list.list_issue_date_time {
        date_time(w, el::LIST_ISSUE_DATE_TIME, t)?;
    }
    let next_update = tsl(el::NEXT_UPDATE);
    match list.next_update {
        Some(t) => {
            w.start_element(&next_update, &[])?;
            date_time(w, el::DATE_TIME, t)?;
            w.end_element(&next_update)?;
        }
        // A closed list has an empty NextUpdate.
        None => w.empty_element(&next_update, &[])?,
    }
    uris(w, el::DISTRIBUTION_POINTS, &list.distribution_points)?;
    w.end_element(&name)
}

fn write_pointer(w: &mut XmlWriter, pointer: &OtherTslPointer) -> Result<(), Error> {
    let name = tsl(el::OTHER_TSL_POINTER);
    w.start_element(&name, &[])?;
    let identities: Vec<_> = pointer
        .service_digital_identities
        .iter()
        .filter(|ids| !ids.is_empty())
        .collect();
    if !identities.is_empty() {
        let list = tsl(el::SERVICE_DIGITAL_IDENTITIES);
        w.start_element(&list, &[])?;
        for ids in identities {
            digital_identities(w, ids)?;
        }
        w.end_element(&list)?;
    }
    text(w, el::TSL_LOCATION, &pointer.location)?;

    let has_information = pointer.tsl_type.is_some()
        || !pointer.scheme_operator_name.is_empty()
        || !pointer.scheme_types.is_empty()
        || pointer.scheme_territory.is_some();
    if has_information {
        let info = tsl(el::ADDITIONAL_INFORMATION);
        let other = tsl(el::OTHER_INFORMATION);
        w.start_element(&info, &[])?;
        if let Some(tsl_type) = &pointer.tsl_type {
            w.start_element(&other, &[])?;
            text(w, el::TSL_TYPE, tsl_type)?;
            w.end_element(&other)?;
        }
        if !pointer.scheme_operator_name.is_empty() {
            w.start_element(&other, &[])?;
            names(w, el::SCHEME_OPERATOR_NAME, &pointer.scheme_operator_name)?;
            w.end_element(&other)?;
        }
        if !pointer.scheme_types.is_empty() {
            w.start_element(&other, &[])?;
            uris(w, el::SCHEME_TYPE_COMMUNITY_RULES, &pointer.scheme_types)?;
            w.end_element(&other)?;
        }
        if let Some(territory) = &pointer.scheme_territory {
            w.start_element(&other, &[])?;
            text(w, el::SCHEME_TERRITORY, territory)?;
            w.end_element(&other)?;
        }
        w.end_element(&info)?;
    }
    w.end_element(&name)
}

fn write_provider(w: &mut XmlWriter, provider: &TrustServiceProvider) -> Result<(), Error> {
    let name = tsl(el::TRUST_SERVICE_PROVIDER);
    w.start_element(&name, &[])?;

    let info = tsl(el::TSP_INFORMATION);
    w.start_element(&info, &[])?;
    names(w, el::TSP_NAME, &provider.name)?;
    names(w, el::TSP_TRADE_NAME, &provider.trade_name)?;
    address(
        w,
        el::TSP_ADDRESS,
        &provider.postal_addresses,
        &provider.electronic_addresses,
    )?;
    lang_uris(w, el::TSP_INFORMATION_URI, &provider.information_uris)?;
    w.end_element(&info)?;

    if !provider.services.is_empty() {
        let services = tsl(el::TSP_SERVICES);
        w.start_element(&services, &[])?;
        for service in &provider.services {
            write_service(w, service)?;
        }
        w.end_element(&services)?;
    }
    w.end_element(&name)
}

fn write_service(w: &mut XmlWriter, service: &TrustService) -> Result<(), Error> {
    let name = tsl(el::TSP_SERVICE);
    w.start_element(&name, &[])?;

    let info = tsl(el::SERVICE_INFORMATION);
    w.start_element(&info, &[])?;
    text(w, el::SERVICE_TYPE_IDENTIFIER, &service.service_type)?;
    names(w, el::SERVICE_NAME, &service.name)?;
    digital_identities(w, &service.digital_identities)?;
    text(w, el::SERVICE_STATUS, &service.status)?;
    if let Some(t) = service.status_starting_time {
        date_time(w, el::STATUS_STARTING_TIME, t)?;
    }
    if !service.service_supply_points.is_empty() {
        let points = tsl(el::SERVICE_SUPPLY_POINTS);
        w.start_element(&points, &[])?;
        for point in &service.service_supply_points {
            text(w, el::SERVICE_SUPPLY_POINT, point)?;
        }
        w.end_element(&points)?;
    }
    if !service.qualifications.is_empty() || !service.other_extensions.is_empty() {
        let extensions = tsl(el::SERVICE_INFORMATION_EXTENSIONS);
        let extension = tsl(el::EXTENSION);
        w.start_element(&extensions, &[])?;
        if !service.qualifications.is_empty() {
            w.start_element(&extension, &[(attr::CRITICAL, flag(service.qualifications_critical))])?;
            write_qualifications(w, &service.qualifications)?;
            w.end_element(&extension)?;
        }
        for other in &service.other_extensions {
            w.start_element(&extension, &[(attr::CRITICAL, flag(other.critical))])?;
            w.write_raw(&other.content)?;
            w.end_element(&extension)?;
        }
        w.end_element(&extensions)?;
    }
    w.end_element(&info)?;

    if !service.history.is_empty() {
        let history = tsl(el::SERVICE_HISTORY);
        w.start_element(&history, &[])?;
        for instance in &service.history {
            write_history_instance(w, instance)?;
        }
        w.end_element(&history)?;
    }
    w.end_element(&name)
}

fn write_history_instance(w: &mut XmlWriter, instance: &ServiceHistoryInstance) -> Result<(), Error> {
    let name = tsl(el::SERVICE_HISTORY_INSTANCE);
    w.start_element(&name, &[])?;
    text(w, el::SERVICE_TYPE_IDENTIFIER, &instance.service_type)?;
    names(w, el::SERVICE_NAME, &instance.name)?;
    digital_identities(w, &instance.digital_identities)?;
    text(w, el::SERVICE_STATUS, &instance.status)?;
    if let Some(t) = instance.status_starting_time {
        date_time(w, el::STATUS_STARTING_TIME, t)?;
    }
    w.end_element(&name)
}

fn write_qualifications(w: &mut XmlWriter, qualifications: &[Qualification]) -> Result<(), Error> {
    let root = ecc(el::QUALIFICATIONS);
    w.start_element(&root, &[])?;
    for qualification in qualifications {
        let element = ecc(el::QUALIFICATION_ELEMENT);
        w.start_element(&element, &[])?;

        let qualifiers = ecc(el::QUALIFIERS);
        w.start_element(&qualifiers, &[])?;
        for qualifier in &qualification.qualifiers {
            w.empty_element(&ecc(el::QUALIFIER), &[(attr::QUALIFIER_URI, qualifier.as_str())])?;
        }
        w.end_element(&qualifiers)?;

        let criteria = ecc(el::CRITERIA_LIST);
        w.start_element(&criteria, &[(attr::ASSERT, qualification.criteria_assert.as_str())])?;
        for policy_set in &qualification.policy_sets {
            let set = ecc(el::POLICY_SET);
            w.start_element(&set, &[])?;
            for policy in policy_set {
                let identifier = ecc(el::POLICY_IDENTIFIER);
                w.start_element(&identifier, &[])?;
                w.text_element(&xades(el::IDENTIFIER), &[], &policy.oid)?;
                if let Some(description) = &policy.description {
                    w.text_element(&xades(el::DESCRIPTION), &[], description)?;
                }
                w.end_element(&identifier)?;
            }
            w.end_element(&set)?;
        }
        w.end_element(&criteria)?;
        w.end_element(&element)?;
    }
    w.end_element(&root)
}

fn digital_identities(w: &mut XmlWriter, identities: &[DigitalIdentity]) -> Result<(), Error> {
    if identities.is_empty() {
        return Ok(());
    }
    let engine = base64::engine::general_purpose::STANDARD;
    let list = tsl(el::SERVICE_DIGITAL_IDENTITY);
    w.start_element(&list, &[])?;
    for identity in identities {
        let id = tsl(el::DIGITAL_ID);
        w.start_element(&id, &[])?;
        match identity {
            DigitalIdentity::X509Certificate(der) => {
                text(w, el::X509_CERTIFICATE, &engine.encode(der))?
            }
            DigitalIdentity::X509SubjectName(subject) => text(w, el::X509_SUBJECT_NAME, subject)?,
            DigitalIdentity::X509Ski(ski) => text(w, el::X509_SKI, &engine.encode(ski))?,
        }
        w.end_element(&id)?;
    }
    w.end_element(&list)
}

// ── Leaves ───────────────────────────────────────────────────────────

fn text(w: &mut XmlWriter, local: &str, value: &str) -> Result<(), Error> {
    w.text_element(&tsl(local), &[], value)
}

fn date_time(w: &mut XmlWriter, local: &str, t: OffsetDateTime) -> Result<(), Error> {
    text(w, local, &datetime::format(t)?)
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// `<wrapper><tsl:Name xml:lang=…>…</tsl:Name>…</wrapper>`, skipped when empty.
fn names(w: &mut XmlWriter, wrapper: &str, values: &LangStrings) -> Result<(), Error> {
    lang_items(w, wrapper, el::NAME, values)
}

fn lang_uris(w: &mut XmlWriter, wrapper: &str, values: &LangStrings) -> Result<(), Error> {
    lang_items(w, wrapper, el::URI, values)
}

fn lang_items(w: &mut XmlWriter, wrapper: &str, item: &str, values: &LangStrings) -> Result<(), Error> {
    if values.is_empty() {
        return Ok(());
    }
    let wrapper = tsl(wrapper);
    let item = tsl(item);
    w.start_element(&wrapper, &[])?;
    for value in values.iter() {
        w.text_element(&item, &[(XML_LANG, value.lang.as_str())], &value.value)?;
    }
    w.end_element(&wrapper)
}

fn uris(w: &mut XmlWriter, wrapper: &str, values: &[String]) -> Result<(), Error> {
    if values.is_empty() {
        return Ok(());
    }
    let wrapper = tsl(wrapper);
    w.start_element(&wrapper, &[])?;
    for value in values {
        text(w, el::URI, value)?;
    }
    w.end_element(&wrapper)
}

fn address(
    w: &mut XmlWriter,
    wrapper: &str,
    postal: &[PostalAddress],
    electronic: &[String],
) -> Result<(), Error> {
    if postal.is_empty() && electronic.is_empty() {
        return Ok(());
    }
    let wrapper = tsl(wrapper);
    w.start_element(&wrapper, &[])?;
    if !postal.is_empty() {
        let list = tsl(el::POSTAL_ADDRESSES);
        w.start_element(&list, &[])?;
        for address in postal {
            let name = tsl(el::POSTAL_ADDRESS);
            w.start_element(&name, &[(XML_LANG, address.lang.as_str())])?;
            text(w, el::STREET_ADDRESS, &address.street_address)?;
            text(w, el::LOCALITY, &address.locality)?;
            if let Some(state) = &address.state_or_province {
                text(w, el::STATE_OR_PROVINCE, state)?;
            }
            if let Some(code) = &address.postal_code {
                text(w, el::POSTAL_CODE, code)?;
            }
            text(w, el::COUNTRY_NAME, &address.country_name)?;
            w.end_element(&name)?;
        }
        w.end_element(&list)?;
    }
    uris(w, el::ELECTRONIC_ADDRESS, electronic)?;
    w.end_element(&wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_id_per_marshal() {
        let list = TrustList::new();
        let (first, xml) = marshal(&list).unwrap();
        let (second, _) = marshal(&list).unwrap();
        assert!(first.starts_with("tsl-"));
        assert_ne!(first, second);
        assert!(!xml.starts_with("<?xml"));
        assert!(xml.starts_with("<tsl:TrustServiceStatusList "));
    }

    #[test]
    fn empty_list_header() {
        let (id, xml) = marshal(&TrustList::new()).unwrap();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let root = doc.root_element();
        assert_eq!(root.attribute("Id"), Some(id.as_str()));
        assert_eq!(root.attribute("TSLTag"), Some(TSL_TAG));
        assert!(xml.contains("<tsl:TSLVersionIdentifier>3</tsl:TSLVersionIdentifier>"));
        assert!(xml.contains("<tsl:TSLSequenceNumber>1</tsl:TSLSequenceNumber>"));
        assert!(xml.contains("<tsl:NextUpdate/>"));
        assert!(!xml.contains("TrustServiceProviderList"));
    }

    #[test]
    fn qualification_layout() {
        let mut service = TrustService::new(
            "Root CA",
            crate::service::service_type::CA_QC,
            crate::service::status::UNDER_SUPERVISION,
        );
        service.add_qualification(crate::service::qualifier::QC_NO_SSCD, "2.16.56.1.1.1.2.1", Some("Citizen"));
        let mut provider = TrustServiceProvider::new("Certipost");
        provider.add_trust_service(service);
        let mut list = TrustList::new();
        list.add_trust_service_provider(provider);

        let (_, xml) = marshal(&list).unwrap();
        assert!(xml.contains(r#"<tsl:Extension Critical="true"><ecc:Qualifications>"#));
        assert!(xml.contains(r#"<ecc:CriteriaList assert="atLeastOne"><ecc:PolicySet><ecc:PolicyIdentifier><xades:Identifier>2.16.56.1.1.1.2.1</xades:Identifier><xades:Description>Citizen</xades:Description>"#));
    }

    #[test]
    fn loaded_extension_layout_is_written_back() {
        let mut service = TrustService::new(
            "Root CA",
            crate::service::service_type::CA_QC,
            crate::service::status::UNDER_SUPERVISION,
        );
        let mut grouped = Qualification::new(crate::service::qualifier::QC_SSCD_STATUS_AS_IN_CERT);
        grouped
            .qualifiers
            .push(crate::service::qualifier::QC_FOR_LEGAL_PERSON.to_owned());
        service.qualifications.push(grouped);
        service.qualifications_critical = false;
        service.other_extensions.push(crate::service::OtherExtension {
            critical: true,
            content: r#"<x:Flag xmlns:x="urn:x">on</x:Flag>"#.to_owned(),
        });
        service.service_supply_points.push("http://crl.example.be/".to_owned());
        let mut provider = TrustServiceProvider::new("Certipost");
        provider.add_trust_service(service);
        let mut list = TrustList::new();
        list.add_trust_service_provider(provider);

        let (_, xml) = marshal(&list).unwrap();
        assert!(xml.contains(r#"<tsl:ServiceSupplyPoints><tsl:ServiceSupplyPoint>http://crl.example.be/</tsl:ServiceSupplyPoint></tsl:ServiceSupplyPoints><tsl:ServiceInformationExtensions><tsl:Extension Critical="false"><ecc:Qualifications><ecc:QualificationElement><ecc:Qualifiers><ecc:Qualifier uri="http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/SvcInfoExt/QCSSCDStatusAsInCert"/><ecc:Qualifier uri="http://uri.etsi.org/TrstSvc/eSigDir-1999-93-EC-TrustedList/SvcInfoExt/QCForLegalPerson"/></ecc:Qualifiers>"#));
        assert!(xml.contains(r#"<tsl:Extension Critical="true"><x:Flag xmlns:x="urn:x">on</x:Flag></tsl:Extension></tsl:ServiceInformationExtensions>"#));
    }

    #[test]
    fn pointer_without_additional_information() {
        let mut list = TrustList::new();
        list.add_other_tsl_pointer(OtherTslPointer::new("http://tsl.example.nl/tsl.xml"));
        let (_, xml) = marshal(&list).unwrap();
        assert!(xml.contains(r#"<tsl:OtherTSLPointer><tsl:TSLLocation>http://tsl.example.nl/tsl.xml</tsl:TSLLocation></tsl:OtherTSLPointer>"#));
    }
}
