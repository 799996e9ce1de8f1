#![allow(dead_code)]

use clarity_core::{Method, MemoryTransport, Session, SessionConfig};

pub const URL: &str = "http://testgenologics.com:4040";

pub fn session() -> (Session, MemoryTransport) {
    let transport = MemoryTransport::new();
    let config = SessionConfig::new(URL).expect("valid test url");
    let session = Session::new(config, transport.clone()).expect("session should open");
    (session, transport)
}

pub fn serve(transport: &MemoryTransport, uri: &str, body: &str) {
    transport.respond(Method::Get, uri, 200, body);
}

pub fn artifact_xml() -> String {
    format!(
        r#"<?xml version='1.0' encoding='utf-8'?>
<art:artifact xmlns:art="http://genologics.com/ri/artifact" xmlns:file="http://genologics.com/ri/file" xmlns:udf="http://genologics.com/ri/userdefined" uri="{URL}/api/v2/artifacts/a1" limsid="a1">
<name>test_sample1</name>
<type>Analyte</type>
<output-type>Analyte</output-type>
<qc-flag>PASSED</qc-flag>
<location>
  <container uri="{URL}/api/v2/containers/c1" limsid="c1"/>
  <value>A:1</value>
</location>
<working-flag>true</working-flag>
<sample uri="{URL}/api/v2/samples/s1" limsid="s1"/>
<udf:field type="Numeric" name="Ave. Conc. (ng/uL)">1</udf:field>
<udf:field type="String" name="Workflow Desired">TruSeq Nano DNA Sample Prep</udf:field>
<workflow-stages>
<workflow-stage status="QUEUED" name="Test workflow s2" uri="{URL}/api/v2/configuration/workflows/1/stages/2"/>
<workflow-stage status="COMPLETE" name="Test workflow s1" uri="{URL}/api/v2/configuration/workflows/1/stages/1"/>
</workflow-stages>
</art:artifact>"#
    )
}

pub fn step_placements_xml(container: &str, loc1: &str, loc2: &str) -> String {
    format!(
        r#"<?xml version='1.0' encoding='utf-8'?>
<stp:placements xmlns:stp="http://genologics.com/ri/step" uri="{URL}/steps/s1/placements">
  <step uri="{URL}/steps/s1" />
  <configuration uri="{URL}/configuration/protocols/1/steps/1">Step name</configuration>
  <selected-containers>
    <container uri="{URL}/containers/{container}" />
  </selected-containers>
  <output-placements>
    <output-placement uri="{URL}/artifacts/a1">
      <location>
        <container limsid="{container}" uri="{URL}/containers/{container}" />
        <value>{loc1}</value>
      </location>
    </output-placement>
    <output-placement uri="{URL}/artifacts/a2">
      <location>
        <container limsid="{container}" uri="{URL}/containers/{container}" />
        <value>{loc2}</value>
      </location>
    </output-placement>
  </output-placements>
</stp:placements>"#
    )
}

pub fn reagent_kit_xml() -> String {
    format!(
        r#"<?xml version='1.0' encoding='utf-8'?>
<kit:reagent-kit xmlns:kit="http://genologics.com/ri/reagentkit" uri="{URL}:8080/api/v2/reagentkits/r1">
<name>regaentkitname</name>
<supplier>reagentProvider</supplier>
<website>www.reagentprovider.com</website>
<archived>false</archived>
</kit:reagent-kit>"#
    )
}

pub fn reagent_lot_xml() -> String {
    format!(
        r#"<?xml version='1.0' encoding='utf-8'?>
<lot:reagent-lot xmlns:lot="http://genologics.com/ri/reagentlot" limsid="l1" uri="{URL}/api/v2/reagentlots/l1">
<reagent-kit uri="{URL}/api/v2/reagentkits/r1" name="kitname"/>
<name>kitname</name>
<lot-number>100</lot-number>
<created-date>2015-07-16</created-date>
<last-modified-date>2015-08-17</last-modified-date>
<expiry-date>2022-08-16</expiry-date>
<created-by uri="{URL}/api/v2/researchers/1"/>
<last-modified-by uri="{URL}/api/v2/researchers/1"/>
<status>ARCHIVED</status>
<usage-count>1</usage-count>
</lot:reagent-lot>"#
    )
}

pub fn step_xml(step_id: &str) -> String {
    format!(
        r#"<?xml version='1.0' encoding='utf-8'?>
<stp:step xmlns:stp="http://genologics.com/ri/step" current-state="Completed" limsid="{step_id}" uri="{URL}/api/v2/steps/{step_id}">
<configuration uri="{URL}/api/v2/configuration/protocols/p1/steps/p1s1">My fancy protocol</configuration>
<date-started>2016-11-22T10:43:32.857+00:00</date-started>
<date-completed>2016-11-22T14:31:14.100+00:00</date-completed>
<actions uri="{URL}/api/v2/steps/{step_id}/actions"/>
<placements uri="{URL}/api/v2/steps/{step_id}/placements"/>
<program-status uri="{URL}/api/v2/steps/{step_id}/programstatus"/>
<details uri="{URL}/api/v2/steps/{step_id}/details"/>
<available-programs>
<available-program name="program1" uri="{URL}/api/v2/steps/{step_id}/trigger/t1"/>
<available-program name="program2" uri="{URL}/api/v2/steps/{step_id}/trigger/t2"/>
</available-programs>
</stp:step>"#
    )
}

pub fn program_status_xml(step_id: &str) -> String {
    format!(
        r#"<?xml version='1.0' encoding='utf-8'?>
<stp:program-status xmlns:stp="http://genologics.com/ri/step" uri="{URL}/api/v2/steps/{step_id}/programstatus">
<step uri="{URL}/api/v2/steps/{step_id}" rel="steps"/>
<configuration uri="{URL}/api/v2/configuration/protocols/p1/steps/p1s1">My fancy protocol</configuration>
<status>ERROR</status>
<message>Traceback Error message</message>
</stp:program-status>"#
    )
}

pub fn protocol_step_xml(uri: &str) -> String {
    format!(
        r#"<?xml version='1.0' encoding='utf-8'?>
<protstepcnf:step xmlns:protstepcnf="http://genologics.com/ri/protocolconfiguration" name="My fancy step" protocol-step-index="1" uri="{uri}">
<permitted-containers>
<container-type>Tube</container-type>
<container-type>96 well plate</container-type>
</permitted-containers>
</protstepcnf:step>"#
    )
}

pub fn step_actions_xml() -> String {
    format!(
        r#"<stp:actions xmlns:stp="http://genologics.com/ri/step" uri="...">
  <step rel="..." uri="{URL}/steps/s1">
  </step>
  <configuration uri="{URL}/config/1">...</configuration>
  <next-actions>
    <next-action artifact-uri="{URL}/artifacts/a1" action="requeue" step-uri="..." rework-step-uri="...">
    </next-action>
  </next-actions>
  <escalation>
    <request>
      <author uri="{URL}/researchers/r1">
        <first-name>foo</first-name>
        <last-name>bar</last-name>
      </author>
      <reviewer uri="{URL}/researchers/r1">
        <first-name>foo</first-name>
        <last-name>bar</last-name>
      </reviewer>
      <date>01-01-1970</date>
      <comment>no comments</comment>
    </request>
    <review>
      <author uri="{URL}/researchers/r1">
        <first-name>foo</first-name>
        <last-name>bar</last-name>
      </author>
      <date>01-01-1970</date>
      <comment>no comments</comment>
    </review>
    <escalated-artifacts>
      <escalated-artifact uri="{URL}/artifacts/r1">
      </escalated-artifact>
    </escalated-artifacts>
  </escalation>
</stp:actions>"#
    )
}

pub fn step_actions_no_escalation_xml() -> String {
    format!(
        r#"<stp:actions xmlns:stp="http://genologics.com/ri/step" uri="{URL}/steps/s1/actions">
  <step rel="..." uri="{URL}/steps/s1">
  </step>
  <configuration uri="{URL}/config/1">...</configuration>
  <next-actions>
    <next-action artifact-uri="{URL}/artifacts/a1" action="requeue" step-uri="{URL}/steps/s1" rework-step-uri="{URL}/steps/s2">
    </next-action>
  </next-actions>
</stp:actions>"#
    )
}

pub fn sample_creation_xml() -> String {
    format!(
        r#"
<smp:samplecreation xmlns:smp="http://genologics.com/ri/sample" limsid="s1" uri="{URL}/api/v2/samples/s1">
  <location>
    <container limsid="cont1" uri="{URL}/api/v2/containers/cont1">
    </container>
    <value>1:1</value>
  </location>
  <name>
    sample1
  </name>
  <project uri="{URL}/api/v2/projects/p1" limsid="p1">
  </project>
</smp:samplecreation>
"#
    )
}
