// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `Report`.

use crate::{NonPassKind, Output, Property, Report, TestCase, TestCaseStatus, TestSuite};
use quick_xml::{
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, Event},
    Writer,
};
use std::{borrow::Cow, io, time::Duration};

static TESTSUITES_TAG: &str = "testsuites";
static TESTSUITE_TAG: &str = "testsuite";
static TESTCASE_TAG: &str = "testcase";
static PROPERTIES_TAG: &str = "properties";
static PROPERTY_TAG: &str = "property";
static STEP_TAG: &str = "step";
static EXPECTED_TAG: &str = "expected";
static FAILURE_TAG: &str = "failure";
static ERROR_TAG: &str = "error";
static SKIPPED_TAG: &str = "skipped";
static SYSTEM_OUT_TAG: &str = "system-out";
static SYSTEM_ERR_TAG: &str = "system-err";

static TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub(crate) fn serialize_report(
    report: &Report,
    writer: impl io::Write,
) -> quick_xml::Result<()> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))?;

    serialize_report_impl(report, &mut writer)?;

    // Trailing newline.
    writer.into_inner().write_all(b"\n")?;
    Ok(())
}

fn serialize_report_impl(
    report: &Report,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    // Destructure so that new fields are not forgotten here.
    let Report {
        name,
        timestamp,
        time,
        tests,
        failures,
        errors,
        skipped,
        suites,
    } = report;

    let name = xml_safe(name);
    let (tests, time) = (tests.to_string(), serialize_time(time));
    let (failures, errors, skipped) =
        (failures.to_string(), errors.to_string(), skipped.to_string());

    let mut testsuites_tag = BytesStart::new(TESTSUITES_TAG);
    testsuites_tag.push_attribute(("name", name.as_ref()));
    if let Some(timestamp) = timestamp {
        testsuites_tag.push_attribute((
            "timestamp",
            timestamp.format(TIMESTAMP_FORMAT).to_string().as_str(),
        ));
    }
    testsuites_tag.extend_attributes([
        ("tests", tests.as_str()),
        ("time", time.as_str()),
        ("failures", failures.as_str()),
        ("errors", errors.as_str()),
        ("skipped", skipped.as_str()),
    ]);
    writer.write_event(Event::Start(testsuites_tag))?;

    for suite in suites {
        serialize_suite(suite, writer)?;
    }

    serialize_end_tag(TESTSUITES_TAG, writer)?;

    Ok(())
}

fn serialize_suite(
    suite: &TestSuite,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let TestSuite {
        name,
        timestamp,
        tests,
        failures,
        errors,
        skipped,
        time,
        test_cases,
        properties,
        system_out,
        system_err,
    } = suite;

    let name = xml_safe(name);
    let (tests, time) = (tests.to_string(), serialize_time(time));
    let (failures, errors, skipped) =
        (failures.to_string(), errors.to_string(), skipped.to_string());

    let mut suite_tag = BytesStart::new(TESTSUITE_TAG);
    suite_tag.push_attribute(("name", name.as_ref()));
    if let Some(timestamp) = timestamp {
        suite_tag.push_attribute((
            "timestamp",
            timestamp.format(TIMESTAMP_FORMAT).to_string().as_str(),
        ));
    }
    suite_tag.extend_attributes([
        ("tests", tests.as_str()),
        ("time", time.as_str()),
        ("failures", failures.as_str()),
        ("errors", errors.as_str()),
        ("skipped", skipped.as_str()),
    ]);
    writer.write_event(Event::Start(suite_tag))?;

    if !properties.is_empty() {
        serialize_empty_start_tag(PROPERTIES_TAG, writer)?;
        for property in properties {
            serialize_property(property, writer)?;
        }
        serialize_end_tag(PROPERTIES_TAG, writer)?;
    }

    for test_case in test_cases {
        serialize_test_case(test_case, writer)?;
    }

    if let Some(system_out) = system_out {
        serialize_output(system_out, SYSTEM_OUT_TAG, writer)?;
    }
    if let Some(system_err) = system_err {
        serialize_output(system_err, SYSTEM_ERR_TAG, writer)?;
    }

    serialize_end_tag(TESTSUITE_TAG, writer)?;
    Ok(())
}

fn serialize_property(
    property: &Property,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let name = xml_safe(&property.name);
    let value = xml_safe(&property.value);

    let mut property_tag = BytesStart::new(PROPERTY_TAG);
    property_tag.extend_attributes([("name", name.as_ref()), ("value", value.as_ref())]);

    writer.write_event(Event::Empty(property_tag))?;
    Ok(())
}

fn serialize_test_case(
    test_case: &TestCase,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let TestCase {
        name,
        classname,
        start_time,
        stop_time,
        time,
        status,
        rerun,
        screenshot,
        step,
        expected,
    } = test_case;

    let classname = xml_safe(classname);
    let name = xml_safe(name);
    let screenshot = xml_safe(screenshot);

    let mut testcase_tag = BytesStart::new(TESTCASE_TAG);
    testcase_tag.extend_attributes([("classname", classname.as_ref()), ("name", name.as_ref())]);
    if let Some(start_time) = start_time {
        testcase_tag.push_attribute((
            "starttime",
            start_time.format(TIMESTAMP_FORMAT).to_string().as_str(),
        ));
    }
    if let Some(stop_time) = stop_time {
        testcase_tag.push_attribute((
            "stoptime",
            stop_time.format(TIMESTAMP_FORMAT).to_string().as_str(),
        ));
    }
    testcase_tag.push_attribute(("time", serialize_time(time).as_str()));
    testcase_tag.push_attribute(("status", status.status_attr()));
    testcase_tag.push_attribute(("rerun", rerun.to_string().as_str()));
    testcase_tag.push_attribute(("screenshot", screenshot.as_ref()));
    writer.write_event(Event::Start(testcase_tag))?;

    let step = xml_safe(step);
    let mut step_tag = BytesStart::new(STEP_TAG);
    step_tag.push_attribute(("message", step.as_ref()));
    writer.write_event(Event::Empty(step_tag))?;

    let expected = xml_safe(expected);
    let mut expected_tag = BytesStart::new(EXPECTED_TAG);
    expected_tag.push_attribute(("message", expected.as_ref()));
    writer.write_event(Event::Empty(expected_tag))?;

    match status {
        TestCaseStatus::Pass => {}
        TestCaseStatus::NonPass {
            kind,
            ty,
            message,
            description,
        } => {
            let tag_name = match kind {
                NonPassKind::Failure => FAILURE_TAG,
                NonPassKind::Error => ERROR_TAG,
            };
            let ty = xml_safe(ty);
            let message = xml_safe(message);
            let mut tag = BytesStart::new(tag_name);
            tag.push_attribute(("type", ty.as_ref()));
            tag.push_attribute(("message", message.as_ref()));
            writer.write_event(Event::Start(tag))?;
            serialize_cdata(description, writer)?;
            serialize_end_tag(tag_name, writer)?;
        }
        TestCaseStatus::Skipped { message } => {
            let message = xml_safe(message);
            let mut tag = BytesStart::new(SKIPPED_TAG);
            tag.push_attribute(("type", "skip"));
            tag.push_attribute(("message", message.as_ref()));
            writer.write_event(Event::Empty(tag))?;
        }
    }

    serialize_end_tag(TESTCASE_TAG, writer)?;

    Ok(())
}

fn serialize_output(
    output: &Output,
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    serialize_empty_start_tag(tag_name, writer)?;
    serialize_cdata(output.as_str(), writer)?;
    serialize_end_tag(tag_name, writer)?;
    Ok(())
}

/// Writes `text` as one or more CDATA sections.
///
/// A literal `]]>` cannot appear inside a CDATA section, so the text is split
/// after each `]]` with the `>` starting the next section. Concatenating the
/// section contents reproduces the original text exactly.
fn serialize_cdata(text: &str, writer: &mut Writer<impl io::Write>) -> quick_xml::Result<()> {
    let mut rest = xml_safe(text);
    while let Some(pos) = rest.find("]]>") {
        let (head, tail) = rest.split_at(pos + 2);
        writer.write_event(Event::CData(BytesCData::new(head.to_owned())))?;
        rest = Cow::Owned(tail.to_owned());
    }
    writer.write_event(Event::CData(BytesCData::new(rest.into_owned())))?;
    Ok(())
}

fn serialize_empty_start_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let tag = BytesStart::new(tag_name);
    writer.write_event(Event::Start(tag))?;
    Ok(())
}

fn serialize_end_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let end_tag = BytesEnd::new(tag_name);
    writer.write_event(Event::End(end_tag))?;
    Ok(())
}

// Serialize time as seconds with 6 decimal points.
fn serialize_time(time: &Duration) -> String {
    format!("{:.6}", time.as_secs_f64())
}

/// Returns `text` with every character that is illegal in an XML 1.0
/// document removed.
///
/// The ranges match the XML 1.0 `Char` production plus the Unicode
/// noncharacters: C0 controls other than tab/LF/CR, DEL through U+0084,
/// U+0086 through U+009F, U+FDD0..=U+FDDF, and the U+xFFFE/U+xFFFF pair in
/// every plane.
pub(crate) fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().any(is_illegal_xml_char) {
        Cow::Owned(text.chars().filter(|&c| !is_illegal_xml_char(c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

fn is_illegal_xml_char(c: char) -> bool {
    let cp = c as u32;
    matches!(cp,
        0x00..=0x08
        | 0x0B..=0x0C
        | 0x0E..=0x1F
        | 0x7F..=0x84
        | 0x86..=0x9F
        | 0xFDD0..=0xFDDF)
        || (cp & 0xFFFE) == 0xFFFE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_safe_strips_illegal_chars() {
        assert_eq!(xml_safe("plain text"), "plain text");
        assert_eq!(xml_safe("tab\tand\nnewline\r"), "tab\tand\nnewline\r");
        assert_eq!(xml_safe("nul\u{0}bell\u{7}"), "nulbell");
        assert_eq!(xml_safe("del\u{7f}nbsp ok\u{a0}"), "delnbsp ok\u{a0}");
        assert_eq!(xml_safe("nonchar\u{fdd0}\u{ffff}"), "nonchar");
    }

    #[test]
    fn cdata_splits_on_terminator() {
        let mut report = Report::new("cdata");
        let mut suite = TestSuite::new("suite");
        let status = TestCaseStatus::NonPass {
            kind: NonPassKind::Failure,
            ty: "AssertionError".to_owned(),
            message: "boom".to_owned(),
            description: "before ]]> after".to_owned(),
        };
        suite.add_test_case(TestCase::new("case", status));
        report.add_suite(suite);

        let xml = report.to_string().expect("serialization succeeds");
        assert!(
            xml.contains("<![CDATA[before ]]]]><![CDATA[> after]]>"),
            "]]> split across adjacent sections: {xml}"
        );
    }

    #[test]
    fn timestamps_serialize_when_set() {
        use chrono::{Local, TimeZone};

        let at = Local.with_ymd_and_hms(2024, 3, 5, 7, 9, 11).unwrap();
        let mut report = Report::new("timed");
        report.set_timestamp(at);
        let mut suite = TestSuite::new("suite");
        suite.set_timestamp(at);
        report.add_suite(suite);

        let xml = report.to_string().expect("serialization succeeds");
        assert!(xml.contains("<testsuites name=\"timed\" timestamp=\"2024-03-05 07:09:11.000000\""));
        assert!(xml.contains("<testsuite name=\"suite\" timestamp=\"2024-03-05 07:09:11.000000\""));
    }

    #[test]
    fn counters_accumulate_additively() {
        let mut report = Report::new("totals");

        let mut first = TestSuite::new("first");
        first.add_test_case(TestCase::new("a", TestCaseStatus::Pass));
        first.add_test_case(TestCase::new(
            "b",
            TestCaseStatus::NonPass {
                kind: NonPassKind::Failure,
                ty: String::new(),
                message: String::new(),
                description: String::new(),
            },
        ));

        let mut second = TestSuite::new("second");
        second.add_test_case(TestCase::new(
            "c",
            TestCaseStatus::NonPass {
                kind: NonPassKind::Error,
                ty: String::new(),
                message: String::new(),
                description: String::new(),
            },
        ));
        second.add_test_case(TestCase::new(
            "d",
            TestCaseStatus::Skipped {
                message: "later".to_owned(),
            },
        ));

        report.add_suites([first, second]);

        assert_eq!(report.tests, 4);
        assert_eq!(report.failures, 1);
        assert_eq!(report.errors, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            report.tests,
            report.suites.iter().map(|s| s.tests).sum::<usize>()
        );
    }

    #[test]
    fn empty_report_is_well_formed() {
        let report = Report::new("empty");
        let xml = report.to_string().expect("serialization succeeds");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            "<testsuites name=\"empty\" tests=\"0\" time=\"0.000000\" failures=\"0\" \
             errors=\"0\" skipped=\"0\">"
        ));
        assert!(xml.trim_end().ends_with("</testsuites>"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let mut report = Report::new("stable");
        let mut suite = TestSuite::new("suite");
        let mut test_case = TestCase::new("case", TestCaseStatus::Pass);
        test_case
            .set_classname("tests.Suite")
            .set_time(Duration::from_micros(1500))
            .set_rerun(1)
            .set_steps("do the thing", "thing is done");
        suite.add_test_case(test_case);
        suite.set_system_out("captured output");
        report.add_suite(suite);

        let first = report.to_string().expect("serialization succeeds");
        let second = report.to_string().expect("serialization succeeds");
        assert_eq!(first, second);
    }
}
