#![forbid(unsafe_code)]

//! XML to model.

use crate::element::{self as el, attr};
use crate::lang::LangStrings;
use crate::list::{OtherTslPointer, TrustList};
use crate::provider::{PostalAddress, TrustServiceProvider};
use crate::service::{
    DigitalIdentity, OtherExtension, PolicyIdentifier, Qualification, ServiceHistoryInstance,
    TrustService,
};
use base64::Engine;
use roxmltree::Node;
use time::OffsetDateTime;
use tsledit_c14n::C14nMode;
use tsledit_core::{ns, Error};
use tsledit_xml::document::{find_child, find_children, is_element, raw_text, text_content};
use tsledit_xml::{datetime, NodeSet};

/// Parse a serialized trust list into a model. The caller keeps the text.
pub(crate) fn unmarshal(text: &str) -> Result<TrustList, Error> {
    let doc = roxmltree::Document::parse_with_options(text, tsledit_xml::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))?;
    let root = doc.root_element();
    if !is_element(&root, ns::TSL, el::TRUST_SERVICE_STATUS_LIST) {
        return Err(Error::XmlStructure(format!(
            "expected tsl:{} document element, found {}",
            el::TRUST_SERVICE_STATUS_LIST,
            root.tag_name().name()
        )));
    }
    let scheme = child(root, el::SCHEME_INFORMATION).ok_or_else(|| {
        Error::XmlStructure(format!("missing {}", el::SCHEME_INFORMATION))
    })?;

    let mut list = TrustList::new();
    list.set_id(root.attribute(attr::ID).map(str::to_owned));
    read_scheme_information(scheme, &mut list)?;
    if let Some(providers) = child(root, el::TRUST_SERVICE_PROVIDER_LIST) {
        for provider in children(providers, el::TRUST_SERVICE_PROVIDER) {
            list.providers.push(read_provider(provider)?);
        }
    }
    log::debug!(
        "parsed trust list {} with {} providers",
        list.id().unwrap_or("(no id)"),
        list.providers.len()
    );
    Ok(list)
}

fn read_scheme_information(scheme: Node<'_, '_>, list: &mut TrustList) -> Result<(), Error> {
    if let Some(seq) = text(scheme, el::TSL_SEQUENCE_NUMBER) {
        list.sequence_number = number(&seq, el::TSL_SEQUENCE_NUMBER)?;
    }
    if let Some(tsl_type) = text(scheme, el::TSL_TYPE) {
        list.tsl_type = tsl_type;
    }
    list.scheme_operator_name = lang_strings(child(scheme, el::SCHEME_OPERATOR_NAME), el::NAME);
    if let Some(address) = child(scheme, el::SCHEME_OPERATOR_ADDRESS) {
        list.scheme_operator_postal_addresses = postal_addresses(address);
        list.scheme_operator_electronic_addresses = uris(child(address, el::ELECTRONIC_ADDRESS));
    }
    list.scheme_name = lang_strings(child(scheme, el::SCHEME_NAME), el::NAME);
    list.scheme_information_uris = lang_uris(child(scheme, el::SCHEME_INFORMATION_URI));
    list.status_determination_approach = text(scheme, el::STATUS_DETERMINATION_APPROACH);
    list.scheme_types = uris(child(scheme, el::SCHEME_TYPE_COMMUNITY_RULES));
    list.scheme_territory = text(scheme, el::SCHEME_TERRITORY);
    list.legal_notices = lang_strings(child(scheme, el::POLICY_OR_LEGAL_NOTICE), el::TSL_LEGAL_NOTICE);
    if let Some(days) = text(scheme, el::HISTORICAL_INFORMATION_PERIOD) {
        list.historical_information_period = Some(number(&days, el::HISTORICAL_INFORMATION_PERIOD)?);
    }
    if let Some(pointers) = child(scheme, el::POINTERS_TO_OTHER_TSL) {
        list.other_tsl_pointers = children(pointers, el::OTHER_TSL_POINTER)
            .map(read_pointer)
            .collect::<Result<_, _>>()?;
    }
    list.list_issue_date_time = date_time(scheme, el::LIST_ISSUE_DATE_TIME)?;
    list.next_update = match child(scheme, el::NEXT_UPDATE) {
        Some(next) => date_time(next, el::DATE_TIME)?,
        None => None,
    };
    list.distribution_points = uris(child(scheme, el::DISTRIBUTION_POINTS));
    Ok(())
}

fn read_pointer(pointer: Node<'_, '_>) -> Result<OtherTslPointer, Error> {
    let location = text(pointer, el::TSL_LOCATION)
        .ok_or_else(|| Error::XmlStructure(format!("{} without {}", el::OTHER_TSL_POINTER, el::TSL_LOCATION)))?;
    let mut result = OtherTslPointer::new(location);
    if let Some(identities) = child(pointer, el::SERVICE_DIGITAL_IDENTITIES) {
        for list in children(identities, el::SERVICE_DIGITAL_IDENTITY) {
            result.service_digital_identities.push(digital_identity_list(list)?);
        }
    }
    if let Some(info) = child(pointer, el::ADDITIONAL_INFORMATION) {
        for other in children(info, el::OTHER_INFORMATION) {
            if let Some(t) = text(other, el::TSL_TYPE) {
                result.tsl_type = Some(t);
            }
            if let Some(names) = child(other, el::SCHEME_OPERATOR_NAME) {
                result.scheme_operator_name = lang_strings(Some(names), el::NAME);
            }
            if let Some(rules) = child(other, el::SCHEME_TYPE_COMMUNITY_RULES) {
                result.scheme_types = uris(Some(rules));
            }
            if let Some(territory) = text(other, el::SCHEME_TERRITORY) {
                result.scheme_territory = Some(territory);
            }
        }
    }
    Ok(result)
}

fn read_provider(node: Node<'_, '_>) -> Result<TrustServiceProvider, Error> {
    let mut provider = TrustServiceProvider::default();
    if let Some(info) = child(node, el::TSP_INFORMATION) {
        provider.name = lang_strings(child(info, el::TSP_NAME), el::NAME);
        provider.trade_name = lang_strings(child(info, el::TSP_TRADE_NAME), el::NAME);
        if let Some(address) = child(info, el::TSP_ADDRESS) {
            provider.postal_addresses = postal_addresses(address);
            provider.electronic_addresses = uris(child(address, el::ELECTRONIC_ADDRESS));
        }
        provider.information_uris = lang_uris(child(info, el::TSP_INFORMATION_URI));
    }
    if let Some(services) = child(node, el::TSP_SERVICES) {
        for service in children(services, el::TSP_SERVICE) {
            provider.services.push(read_service(service)?);
        }
    }
    Ok(provider)
}

fn read_service(node: Node<'_, '_>) -> Result<TrustService, Error> {
    let info = child(node, el::SERVICE_INFORMATION)
        .ok_or_else(|| Error::XmlStructure(format!("{} without {}", el::TSP_SERVICE, el::SERVICE_INFORMATION)))?;
    let mut service = TrustService::new("", "", "");
    service.service_type = text(info, el::SERVICE_TYPE_IDENTIFIER).unwrap_or_default();
    service.name = lang_strings(child(info, el::SERVICE_NAME), el::NAME);
    service.digital_identities = digital_identities(info)?;
    service.status = text(info, el::SERVICE_STATUS).unwrap_or_default();
    service.status_starting_time = date_time(info, el::STATUS_STARTING_TIME)?;
    if let Some(points) = child(info, el::SERVICE_SUPPLY_POINTS) {
        service.service_supply_points = children(points, el::SERVICE_SUPPLY_POINT)
            .map(text_content)
            .collect();
    }
    if let Some(extensions) = child(info, el::SERVICE_INFORMATION_EXTENSIONS) {
        for extension in children(extensions, el::EXTENSION) {
            read_extension(extension, &mut service)?;
        }
    }
    if let Some(history) = child(node, el::SERVICE_HISTORY) {
        for instance in children(history, el::SERVICE_HISTORY_INSTANCE) {
            service.history.push(ServiceHistoryInstance {
                service_type: text(instance, el::SERVICE_TYPE_IDENTIFIER).unwrap_or_default(),
                name: lang_strings(child(instance, el::SERVICE_NAME), el::NAME),
                digital_identities: digital_identities(instance)?,
                status: text(instance, el::SERVICE_STATUS).unwrap_or_default(),
                status_starting_time: date_time(instance, el::STATUS_STARTING_TIME)?,
            });
        }
    }
    Ok(service)
}

/// Qualifications go to the model. Any other content of the extension is
/// kept as exclusive canonical XML so it can be written back.
fn read_extension(extension: Node<'_, '_>, service: &mut TrustService) -> Result<(), Error> {
    let critical = matches!(extension.attribute(attr::CRITICAL), Some("true" | "1"));
    let mut content = String::new();
    for node in extension.children().filter(|n| n.is_element()) {
        if is_element(&node, ns::ECC, el::QUALIFICATIONS) {
            service.qualifications_critical = critical;
            service.qualifications.extend(
                find_children(node, ns::ECC, el::QUALIFICATION_ELEMENT).map(read_qualification),
            );
            continue;
        }
        let bytes = tsledit_c14n::canonicalize_doc(
            node.document(),
            C14nMode::Exclusive,
            Some(&NodeSet::tree_without_comments(node)),
            &[],
        )?;
        let xml = String::from_utf8(bytes)
            .map_err(|e| Error::XmlStructure(format!("{}: {e}", el::EXTENSION)))?;
        content.push_str(&xml);
    }
    if !content.is_empty() {
        service.other_extensions.push(OtherExtension { critical, content });
    }
    Ok(())
}

fn read_qualification(element: Node<'_, '_>) -> Qualification {
    let criteria = find_child(element, ns::ECC, el::CRITERIA_LIST);
    let criteria_assert = criteria
        .and_then(|c| c.attribute(attr::ASSERT))
        .unwrap_or("atLeastOne");
    let policy_sets: Vec<Vec<PolicyIdentifier>> = criteria
        .into_iter()
        .flat_map(|c| find_children(c, ns::ECC, el::POLICY_SET))
        .map(|set| {
            find_children(set, ns::ECC, el::POLICY_IDENTIFIER)
                .filter_map(|p| {
                    let oid = find_child(p, ns::XADES, el::IDENTIFIER).map(text_content)?;
                    Some(PolicyIdentifier {
                        oid,
                        description: find_child(p, ns::XADES, el::DESCRIPTION).map(raw_text),
                    })
                })
                .collect()
        })
        .collect();

    Qualification {
        qualifiers: find_children(element, ns::ECC, el::QUALIFIERS)
            .flat_map(|q| find_children(q, ns::ECC, el::QUALIFIER))
            .filter_map(|q| q.attribute(attr::QUALIFIER_URI))
            .map(str::to_owned)
            .collect(),
        criteria_assert: criteria_assert.to_owned(),
        policy_sets,
    }
}

fn digital_identities(parent: Node<'_, '_>) -> Result<Vec<DigitalIdentity>, Error> {
    match child(parent, el::SERVICE_DIGITAL_IDENTITY) {
        Some(list) => digital_identity_list(list),
        None => Ok(Vec::new()),
    }
}

/// The `DigitalId` values of one `ServiceDigitalIdentity`.
fn digital_identity_list(list: Node<'_, '_>) -> Result<Vec<DigitalIdentity>, Error> {
    let mut identities = Vec::new();
    for id in children(list, el::DIGITAL_ID) {
        for value in id.children().filter(|n| n.is_element()) {
            if value.tag_name().namespace() != Some(ns::TSL) {
                continue;
            }
            match value.tag_name().name() {
                el::X509_CERTIFICATE => identities.push(DigitalIdentity::X509Certificate(
                    decode_b64(&text_content(value), el::X509_CERTIFICATE)?,
                )),
                el::X509_SUBJECT_NAME => {
                    identities.push(DigitalIdentity::X509SubjectName(raw_text(value)))
                }
                el::X509_SKI => identities.push(DigitalIdentity::X509Ski(decode_b64(
                    &text_content(value),
                    el::X509_SKI,
                )?)),
                _ => {}
            }
        }
    }
    Ok(identities)
}

// ── Leaves ───────────────────────────────────────────────────────────

fn child<'a, 'input>(parent: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    find_child(parent, ns::TSL, local)
}

fn children<'a, 'input: 'a>(
    parent: Node<'a, 'input>,
    local: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    find_children(parent, ns::TSL, local)
}

/// Trimmed text of a token-typed child.
fn text(parent: Node<'_, '_>, local: &str) -> Option<String> {
    child(parent, local).map(text_content)
}

/// Text of a free-form child, as written.
fn value(parent: Node<'_, '_>, local: &str) -> Option<String> {
    child(parent, local).map(raw_text)
}

fn number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| Error::XmlStructure(format!("{what}: not a number: '{value}'")))
}

fn date_time(parent: Node<'_, '_>, local: &str) -> Result<Option<OffsetDateTime>, Error> {
    text(parent, local)
        .filter(|t| !t.is_empty())
        .map(|t| datetime::parse(&t))
        .transpose()
}

fn lang_strings(wrapper: Option<Node<'_, '_>>, item: &'static str) -> LangStrings {
    lang_items(wrapper, item, raw_text)
}

fn lang_uris(wrapper: Option<Node<'_, '_>>) -> LangStrings {
    lang_items(wrapper, el::URI, text_content)
}

fn lang_items(
    wrapper: Option<Node<'_, '_>>,
    item: &'static str,
    read: fn(Node<'_, '_>) -> String,
) -> LangStrings {
    let mut values = LangStrings::new();
    if let Some(wrapper) = wrapper {
        for node in children(wrapper, item) {
            let lang = node.attribute((ns::XML, attr::LANG)).unwrap_or_default();
            values.push_raw(lang.to_owned(), read(node));
        }
    }
    values
}

fn uris(wrapper: Option<Node<'_, '_>>) -> Vec<String> {
    wrapper
        .map(|w| children(w, el::URI).map(text_content).collect())
        .unwrap_or_default()
}

fn postal_addresses(address: Node<'_, '_>) -> Vec<PostalAddress> {
    let Some(list) = child(address, el::POSTAL_ADDRESSES) else {
        return Vec::new();
    };
    children(list, el::POSTAL_ADDRESS)
        .map(|node| PostalAddress {
            lang: node
                .attribute((ns::XML, attr::LANG))
                .unwrap_or_default()
                .to_owned(),
            street_address: value(node, el::STREET_ADDRESS).unwrap_or_default(),
            locality: value(node, el::LOCALITY).unwrap_or_default(),
            state_or_province: value(node, el::STATE_OR_PROVINCE),
            postal_code: value(node, el::POSTAL_CODE),
            country_name: value(node, el::COUNTRY_NAME).unwrap_or_default(),
        })
        .collect()
}

fn decode_b64(text: &str, what: &str) -> Result<Vec<u8>, Error> {
    let clean: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(clean)
        .map_err(|e| Error::Base64(format!("{what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{qualifier, service_type, status};
    use time::macros::datetime;

    #[test]
    fn wrong_root_is_a_structure_error() {
        let err = unmarshal(r#"<ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#"/>"#).unwrap_err();
        assert!(matches!(err, Error::XmlStructure(_)));
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let err = unmarshal("<tsl:TrustServiceStatusList").unwrap_err();
        assert!(matches!(err, Error::XmlParse(_)));
    }

    #[test]
    fn missing_scheme_information() {
        let xml = format!(r#"<tsl:TrustServiceStatusList xmlns:tsl="{}"/>"#, ns::TSL);
        assert!(matches!(unmarshal(&xml), Err(Error::XmlStructure(_))));
    }

    #[test]
    fn bad_sequence_number() {
        let xml = format!(
            r#"<tsl:TrustServiceStatusList xmlns:tsl="{}"><tsl:SchemeInformation><tsl:TSLSequenceNumber>x</tsl:TSLSequenceNumber></tsl:SchemeInformation></tsl:TrustServiceStatusList>"#,
            ns::TSL
        );
        assert!(matches!(unmarshal(&xml), Err(Error::XmlStructure(_))));
    }

    #[test]
    fn model_survives_marshal_and_unmarshal() {
        let mut list = TrustList::new();
        list.set_scheme_name("en", "BE:Test");
        list.set_scheme_name("nl", "BE:Proef");
        list.set_scheme_operator_name("en", "Fedict");
        list.set_scheme_operator_postal_address(PostalAddress::new(
            "en",
            "Maria-Theresiastraat 1/3",
            "Brussels",
            Some("Brussels"),
            Some("1000"),
            "Belgium",
        ));
        list.set_scheme_operator_electronic_addresses(["http://www.fedict.belgium.be/"]);
        list.add_scheme_information_uri("en", "http://tsl.belgium.be/");
        list.set_status_determination_approach("http://uri.etsi.org/approach");
        list.add_scheme_type("http://uri.etsi.org/rules/common");
        list.set_scheme_territory("BE");
        list.add_legal_notice("en", "Directive 1999/93/EC");
        list.set_historical_information_period(3653 * 3);
        list.set_sequence_number(7);
        list.set_list_issue_date_time(datetime!(2024-01-15 10:00:00 UTC));
        list.set_next_update(datetime!(2024-07-15 10:00:00 UTC));
        list.add_distribution_point("http://tsl.belgium.be/tsl-be.xml");
        let mut pointer = OtherTslPointer::new("http://tsl.example.nl/tsl.xml");
        pointer.scheme_territory = Some("NL".into());
        pointer.scheme_operator_name.set("en", "Logius");
        pointer.scheme_types.push("http://uri.etsi.org/rules/NL".into());
        pointer
            .service_digital_identities
            .push(vec![DigitalIdentity::X509SubjectName("CN=NL Operator".into())]);
        list.add_other_tsl_pointer(pointer);

        let mut service = TrustService::new("Root CA", service_type::CA_QC, status::UNDER_SUPERVISION);
        service.digital_identities.push(DigitalIdentity::X509SubjectName("CN=Root".into()));
        service.digital_identities.push(DigitalIdentity::X509Ski(vec![1, 2, 3]));
        service.status_starting_time = Some(datetime!(2003-01-26 23:00:00 UTC));
        service.service_supply_points.push("http://crl.eid.belgium.be/".into());
        service.add_qualification(qualifier::QC_NO_SSCD, "2.16.56.1.1.1.2.1", Some("Citizen"));
        service.add_qualification(qualifier::QC_NO_SSCD, "2.16.56.1.1.1.7.1", None);
        service.add_history(ServiceHistoryInstance {
            service_type: service_type::CA_QC.into(),
            name: service.name.clone(),
            digital_identities: Vec::new(),
            status: status::ACCREDITED.into(),
            status_starting_time: None,
        });
        let mut provider = TrustServiceProvider::new("Certipost");
        provider.trade_name.set("en", "Certipost NV");
        provider.add_information_uri("en", "http://www.certipost.be");
        provider.add_trust_service(service);
        list.add_trust_service_provider(provider);

        let (id, xml) = crate::marshal::marshal(&list).unwrap();
        let parsed = unmarshal(&xml).unwrap();

        assert_eq!(parsed.id(), Some(id.as_str()));
        assert_eq!(parsed.scheme_names(), list.scheme_names());
        assert_eq!(parsed.scheme_operator_names(), list.scheme_operator_names());
        assert_eq!(
            parsed.scheme_operator_postal_addresses(),
            list.scheme_operator_postal_addresses()
        );
        assert_eq!(
            parsed.scheme_operator_electronic_addresses(),
            list.scheme_operator_electronic_addresses()
        );
        assert_eq!(parsed.scheme_information_uris(), list.scheme_information_uris());
        assert_eq!(parsed.status_determination_approach(), list.status_determination_approach());
        assert_eq!(parsed.scheme_types(), list.scheme_types());
        assert_eq!(parsed.scheme_territory(), Some("BE"));
        assert_eq!(parsed.legal_notices(), list.legal_notices());
        assert_eq!(parsed.historical_information_period(), Some(10959));
        assert_eq!(parsed.sequence_number(), 7);
        assert_eq!(parsed.list_issue_date_time(), list.list_issue_date_time());
        assert_eq!(parsed.next_update(), list.next_update());
        assert_eq!(parsed.distribution_points(), list.distribution_points());
        assert_eq!(parsed.other_tsl_pointers(), list.other_tsl_pointers());
        assert_eq!(parsed.trust_service_providers(), list.trust_service_providers());
    }

    fn service_info(body: &str) -> String {
        format!(
            r#"<tsl:TrustServiceStatusList xmlns:tsl="{}" xmlns:ecc="{}" xmlns:x="urn:x" Id="t"><tsl:SchemeInformation/><tsl:TrustServiceProviderList><tsl:TrustServiceProvider><tsl:TSPServices><tsl:TSPService><tsl:ServiceInformation>{body}</tsl:ServiceInformation></tsl:TSPService></tsl:TSPServices></tsl:TrustServiceProvider></tsl:TrustServiceProviderList></tsl:TrustServiceStatusList>"#,
            ns::TSL,
            ns::ECC
        )
    }

    #[test]
    fn qualifier_grouping_and_critical_flag_are_kept() {
        let xml = service_info(&format!(
            r#"<tsl:ServiceInformationExtensions><tsl:Extension Critical="false"><ecc:Qualifications><ecc:QualificationElement><ecc:Qualifiers><ecc:Qualifier uri="{}"/><ecc:Qualifier uri="{}"/></ecc:Qualifiers><ecc:CriteriaList assert="all"/></ecc:QualificationElement></ecc:Qualifications></tsl:Extension></tsl:ServiceInformationExtensions>"#,
            qualifier::QC_SSCD_STATUS_AS_IN_CERT,
            qualifier::QC_FOR_LEGAL_PERSON
        ));
        let list = unmarshal(&xml).unwrap();
        let service = &list.trust_service_providers()[0].services[0];
        assert!(!service.qualifications_critical);
        assert_eq!(service.qualifications.len(), 1);
        assert_eq!(
            service.qualifications[0].qualifiers,
            [qualifier::QC_SSCD_STATUS_AS_IN_CERT, qualifier::QC_FOR_LEGAL_PERSON]
        );
        assert_eq!(service.qualifications[0].criteria_assert, "all");

        let (_, written) = crate::marshal::marshal(&list).unwrap();
        let again = unmarshal(&written).unwrap();
        assert_eq!(again.trust_service_providers(), list.trust_service_providers());
    }

    #[test]
    fn unknown_extensions_survive_a_remarshal() {
        let xml = service_info(
            r#"<tsl:ServiceSupplyPoints><tsl:ServiceSupplyPoint> http://crl.example.be/ </tsl:ServiceSupplyPoint></tsl:ServiceSupplyPoints><tsl:ServiceInformationExtensions><tsl:Extension Critical="true"><x:Flag a="1"><!-- note -->on</x:Flag></tsl:Extension></tsl:ServiceInformationExtensions>"#,
        );
        let list = unmarshal(&xml).unwrap();
        let service = &list.trust_service_providers()[0].services[0];
        assert_eq!(service.service_supply_points, ["http://crl.example.be/"]);
        assert!(service.qualifications.is_empty());
        assert_eq!(
            service.other_extensions,
            [OtherExtension {
                critical: true,
                content: r#"<x:Flag xmlns:x="urn:x" a="1">on</x:Flag>"#.to_owned(),
            }]
        );

        let (_, written) = crate::marshal::marshal(&list).unwrap();
        let again = unmarshal(&written).unwrap();
        assert_eq!(again.trust_service_providers(), list.trust_service_providers());
    }

    #[test]
    fn free_text_is_not_trimmed() {
        let xml = format!(
            r#"<tsl:TrustServiceStatusList xmlns:tsl="{}"><tsl:SchemeInformation><tsl:SchemeOperatorName><tsl:Name xml:lang="en">A &amp; B "q" &#13;</tsl:Name></tsl:SchemeOperatorName><tsl:SchemeTerritory> BE </tsl:SchemeTerritory></tsl:SchemeInformation></tsl:TrustServiceStatusList>"#,
            ns::TSL
        );
        let list = unmarshal(&xml).unwrap();
        assert_eq!(list.scheme_operator_name("en"), Some("A & B \"q\" \r"));
        assert_eq!(list.scheme_territory(), Some("BE"));

        let (_, written) = crate::marshal::marshal(&list).unwrap();
        assert!(written.contains(r#"A &amp; B "q" &#13;</tsl:Name>"#));
        let again = unmarshal(&written).unwrap();
        assert_eq!(again.scheme_operator_names(), list.scheme_operator_names());
    }
}
