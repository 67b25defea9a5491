use adql_core::{AdqlError, AdqlResult, Identifier, TextPosition};
use adql_metadata::{Catalog, Datatype, DatatypeKind, TableId};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::builders::{ColumnBuilder, ForeignKeyBuilder, SchemaBuilder, TableBuilder};

/// Parses a VODataService `tableset` XML document into a fresh `Catalog`
/// (§4.6/C6). Single streaming pass over `quick_xml` events: schemas,
/// tables, columns and foreign keys are built up on an explicit stack as
/// their closing tags are seen. Foreign keys are collected and resolved in
/// a second, in-memory pass once every table is known, since a
/// `<foreignKey>` may name a table that appears later in the document.
pub fn ingest_tableset(xml: &str) -> AdqlResult<Catalog> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text = true;

    let mut stack: Vec<Node> = Vec::new();
    let mut schemas: Vec<SchemaBuilder> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let offset = reader.buffer_position() as usize;
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| AdqlError::syntax(format!("XML error: {e}"), pos_at(xml, offset), vec![]))?;

        match event {
            Event::Eof => break,
            Event::Start(e) => {
                let tag = local_name(&e);
                stack.push(start_node(&tag, Some(&e))?);
            }
            Event::Empty(e) => {
                let tag = local_name(&e);
                stack.push(start_node(&tag, Some(&e))?);
                close_top(&mut stack, &mut schemas, xml, offset)?;
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| AdqlError::syntax(format!("XML text error: {e}"), pos_at(xml, offset), vec![]))?;
                if let Some(Node::Text(tag, buf)) = stack.last_mut() {
                    let _ = tag;
                    buf.push_str(&normalize_text(&text));
                }
            }
            Event::End(_) => {
                close_top(&mut stack, &mut schemas, xml, offset)?;
            }
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(AdqlError::syntax("unexpected end of document: unclosed element", pos_at(xml, xml.len()), vec![]));
    }

    build_catalog(schemas)
}

/// One element's parse state while it is open on the stack.
enum Node {
    Schema(SchemaBuilder),
    Table(TableBuilder),
    Column(ColumnBuilder),
    ForeignKey(ForeignKeyBuilder),
    FkColumn { from: Option<String>, target: Option<String> },
    /// Leaf scalar elements (name/title/description/...): tag name + the
    /// accumulated, normalized text content.
    Text(String, String),
    /// `<dataType xsi:type="...">TEXT</dataType>`.
    DataType(Option<String>, String),
    /// Anything else (the root `tableset` container, unrecognised
    /// elements): structurally inert, carries no state.
    Opaque,
}

const LEAF_TEXT_TAGS: &[&str] = &[
    "name",
    "title",
    "description",
    "utype",
    "unit",
    "ucd",
    "targetTable",
    "fromColumn",
    "targetColumn",
    "flag",
];

fn start_node(tag: &str, start: Option<&BytesStart<'_>>) -> AdqlResult<Node> {
    Ok(match tag {
        "schema" => Node::Schema(SchemaBuilder::default()),
        "table" => Node::Table(TableBuilder::default()),
        "column" => Node::Column(ColumnBuilder::default()),
        "foreignKey" => Node::ForeignKey(ForeignKeyBuilder::default()),
        "fkColumn" => Node::FkColumn { from: None, target: None },
        "dataType" => {
            let xsi_type = start.and_then(|e| attr_value(e, "type").ok().flatten());
            Node::DataType(xsi_type, String::new())
        }
        t if LEAF_TEXT_TAGS.contains(&t) => Node::Text(t.to_string(), String::new()),
        _ => Node::Opaque,
    })
}

fn close_top(stack: &mut Vec<Node>, schemas: &mut Vec<SchemaBuilder>, xml: &str, offset: usize) -> AdqlResult<()> {
    let Some(node) = stack.pop() else {
        return Err(AdqlError::syntax("unexpected closing tag", pos_at(xml, offset), vec![]));
    };

    match node {
        Node::Schema(schema) => {
            if schema.name.is_none() {
                return Err(AdqlError::syntax("<schema> is missing its required <name>", pos_at(xml, offset), vec!["<name>".into()]));
            }
            match stack.last() {
                None | Some(Node::Opaque) => schemas.push(schema),
                Some(_) => return Err(AdqlError::syntax("<schema> must be a direct child of the tableset root", pos_at(xml, offset), vec![])),
            }
        }
        Node::Table(table) => {
            if table.name.is_none() {
                return Err(AdqlError::syntax("<table> is missing its required <name>", pos_at(xml, offset), vec!["<name>".into()]));
            }
            match stack.last_mut() {
                Some(Node::Schema(schema)) => schema.tables.push(table),
                _ => return Err(AdqlError::syntax("<table> must be a child of <schema>", pos_at(xml, offset), vec![])),
            }
        }
        Node::Column(column) => {
            if column.name.is_none() {
                return Err(AdqlError::syntax("<column> is missing its required <name>", pos_at(xml, offset), vec!["<name>".into()]));
            }
            match stack.last_mut() {
                Some(Node::Table(table)) => table.columns.push(column),
                _ => return Err(AdqlError::syntax("<column> must be a child of <table>", pos_at(xml, offset), vec![])),
            }
        }
        Node::ForeignKey(fk) => {
            if fk.target_table.is_none() {
                return Err(AdqlError::syntax(
                    "<foreignKey> is missing its required <targetTable>",
                    pos_at(xml, offset),
                    vec!["<targetTable>".into()],
                ));
            }
            if fk.mapping.is_empty() {
                return Err(AdqlError::syntax("<foreignKey> has no <fkColumn> mappings", pos_at(xml, offset), vec!["<fkColumn>".into()]));
            }
            match stack.last_mut() {
                Some(Node::Table(table)) => table.foreign_keys.push(fk),
                _ => return Err(AdqlError::syntax("<foreignKey> must be a child of <table>", pos_at(xml, offset), vec![])),
            }
        }
        Node::FkColumn { from, target } => {
            let (Some(from), Some(target)) = (from, target) else {
                return Err(AdqlError::syntax(
                    "<fkColumn> requires both <fromColumn> and <targetColumn>",
                    pos_at(xml, offset),
                    vec!["<fromColumn>".into(), "<targetColumn>".into()],
                ));
            };
            match stack.last_mut() {
                Some(Node::ForeignKey(fk)) => fk.mapping.push((from, target)),
                _ => return Err(AdqlError::syntax("<fkColumn> must be a child of <foreignKey>", pos_at(xml, offset), vec![])),
            }
        }
        Node::DataType(xsi_type, text) => {
            let xsi_type = xsi_type.unwrap_or_default();
            if xsi_type != "vs:TAPType" && xsi_type != "vs:VOTableType" {
                return Err(AdqlError::syntax(
                    format!("<dataType> has unsupported xsi:type \"{xsi_type}\""),
                    pos_at(xml, offset),
                    vec!["vs:TAPType".into(), "vs:VOTableType".into()],
                ));
            }
            let (datatype, is_unknown) = parse_datatype_name(&text);
            if is_unknown {
                return Err(AdqlError::syntax(format!("<dataType> names an unrecognised type \"{text}\""), pos_at(xml, offset), vec![]));
            }
            if let Some(Node::Column(column)) = stack.last_mut() {
                column.datatype = Some(datatype);
            }
        }
        Node::Text(tag, text) => attach_leaf_text(stack, &tag, text, xml, offset)?,
        Node::Opaque => {}
    }
    Ok(())
}

fn attach_leaf_text(stack: &mut [Node], tag: &str, text: String, xml: &str, offset: usize) -> AdqlResult<()> {
    let Some(parent) = stack.last_mut() else {
        return Ok(());
    };
    match (parent, tag) {
        (Node::Schema(s), "name") => {
            if s.name.is_some() {
                return Err(duplicate_name_error("schema", xml, offset));
            }
            s.name = Some(text);
        }
        (Node::Schema(s), "title") => s.title = Some(text),
        (Node::Schema(s), "description") => s.description = Some(text),
        (Node::Schema(s), "utype") => s.utype = Some(text),
        (Node::Table(t), "name") => {
            if t.name.is_some() {
                return Err(duplicate_name_error("table", xml, offset));
            }
            t.name = Some(text);
        }
        (Node::Table(t), "title") => t.title = Some(text),
        (Node::Table(t), "description") => t.description = Some(text),
        (Node::Table(t), "utype") => t.utype = Some(text),
        (Node::Column(c), "name") => {
            if c.name.is_some() {
                return Err(duplicate_name_error("column", xml, offset));
            }
            c.name = Some(text);
        }
        (Node::Column(c), "description") => c.description = Some(text),
        (Node::Column(c), "unit") => c.unit = Some(text),
        (Node::Column(c), "ucd") => c.ucd = Some(text),
        (Node::Column(c), "utype") => c.utype = Some(text),
        (Node::Column(c), "flag") => match text.trim().to_ascii_lowercase().as_str() {
            "principal" => c.flags.principal = true,
            "indexed" => c.flags.indexed = true,
            "std" => c.flags.std = true,
            "nullable" => c.flags.nullable = true,
            _ => {}
        },
        (Node::ForeignKey(f), "targetTable") => f.target_table = Some(text),
        (Node::ForeignKey(f), "description") => f.description = Some(text),
        (Node::ForeignKey(f), "utype") => f.utype = Some(text),
        (Node::FkColumn { from, .. }, "fromColumn") => *from = Some(text),
        (Node::FkColumn { target, .. }, "targetColumn") => *target = Some(text),
        _ => {}
    }
    Ok(())
}

fn duplicate_name_error(element: &str, xml: &str, offset: usize) -> AdqlError {
    AdqlError::syntax(format!("{element} element carries more than one <name>"), pos_at(xml, offset), vec![])
}

fn local_name(e: &BytesStart<'_>) -> String {
    local_name_bytes(e.name().as_ref())
}

fn local_name_bytes(raw: &[u8]) -> String {
    let s = String::from_utf8_lossy(raw);
    match s.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => s.to_string(),
    }
}

fn attr_value(e: &BytesStart<'_>, local_attr_name: &str) -> AdqlResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| AdqlError::syntax(format!("XML attribute error: {err}"), TextPosition::default(), vec![]))?;
        let key = local_name_bytes(attr.key.as_ref());
        if key == local_attr_name {
            let value = attr
                .unescape_value()
                .map_err(|err| AdqlError::syntax(format!("XML attribute error: {err}"), TextPosition::default(), vec![]))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn pos_at(xml: &str, offset: usize) -> TextPosition {
    let offset = offset.min(xml.len());
    let consumed = &xml[..offset];
    let line = consumed.bytes().filter(|&b| b == b'\n').count() + 1;
    let col = match consumed.rfind('\n') {
        Some(nl) => offset - nl,
        None => offset + 1,
    };
    TextPosition::at(line, col)
}

/// Trims each line and preserves blank lines as a single `\n`.
fn normalize_text(raw: &str) -> String {
    raw.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}

fn parse_datatype_name(raw: &str) -> (Datatype, bool) {
    let trimmed = raw.trim();
    let (base, length) = match trimmed.find('(') {
        Some(open) if trimmed.ends_with(')') => {
            let len_str = &trimmed[open + 1..trimmed.len() - 1];
            (&trimmed[..open], len_str.trim().parse::<u32>().ok())
        }
        _ => (trimmed, None),
    };
    let kind = match base.to_ascii_uppercase().as_str() {
        "CHAR" => Some(DatatypeKind::Char),
        "VARCHAR" => Some(DatatypeKind::Varchar),
        "CLOB" | "ADQL:CLOB" => Some(DatatypeKind::Clob),
        "TIMESTAMP" | "ADQL:TIMESTAMP" => Some(DatatypeKind::Timestamp),
        "SMALLINT" | "BOOLEAN" => Some(DatatypeKind::Smallint),
        "INTEGER" | "INT" => Some(DatatypeKind::Integer),
        "BIGINT" => Some(DatatypeKind::Bigint),
        "REAL" | "FLOAT" => Some(DatatypeKind::Real),
        "DOUBLE" => Some(DatatypeKind::Double),
        "BINARY" => Some(DatatypeKind::Binary),
        "VARBINARY" => Some(DatatypeKind::Varbinary),
        "BLOB" => Some(DatatypeKind::Blob),
        "POINT" | "ADQL:POINT" => Some(DatatypeKind::Point),
        "REGION" | "ADQL:REGION" => Some(DatatypeKind::Region),
        "UNKNOWN" => Some(DatatypeKind::Unknown),
        _ => None,
    };
    match kind {
        Some(kind) => {
            let length = length.filter(|_| Datatype::accepts_length(kind));
            (Datatype { kind, length }, false)
        }
        None => (Datatype::new(DatatypeKind::Unknown), true),
    }
}

fn build_catalog(schemas: Vec<SchemaBuilder>) -> AdqlResult<Catalog> {
    let mut catalog = Catalog::new();
    let mut pending_fks: Vec<(TableId, ForeignKeyBuilder)> = Vec::new();
    let mut table_ids: Vec<(Option<String>, String, TableId)> = Vec::new();

    for schema in schemas {
        let schema_name = schema.name.clone().ok_or_else(AdqlError::missing_name)?;
        let schema_id = catalog.add_schema(Identifier::normalize(&schema_name)?, schema.title, schema.description, schema.utype);

        for table in schema.tables {
            let table_name = table.name.clone().ok_or_else(AdqlError::missing_name)?;
            let table_id = catalog.add_table(Some(schema_id), &table_name, table.kind, table.title, table.description, table.utype)?;
            let simplified_name = catalog.table(table_id).expect("just inserted").identifier.adql_name().to_string();
            table_ids.push((Some(schema_name.clone()), simplified_name, table_id));

            for column in table.columns {
                let column_name = column.name.ok_or_else(AdqlError::missing_name)?;
                catalog.add_column(
                    table_id,
                    Identifier::normalize(&column_name)?,
                    column.datatype,
                    column.unit,
                    column.ucd,
                    column.utype,
                    column.description,
                    column.flags,
                    None,
                )?;
            }

            for fk in table.foreign_keys {
                pending_fks.push((table_id, fk));
            }
        }
    }

    for (from_table, fk) in pending_fks {
        let target_name = fk.target_table.clone().expect("validated when <foreignKey> closed");
        let target_table = resolve_target_table(&table_ids, &target_name)?;
        catalog.add_foreign_key(from_table, target_table, fk.description, fk.utype, fk.mapping)?;
    }

    Ok(catalog)
}

fn resolve_target_table(table_ids: &[(Option<String>, String, TableId)], target_name: &str) -> AdqlResult<TableId> {
    if let Some((schema, table)) = target_name.split_once('.') {
        let candidates: Vec<_> = table_ids.iter().filter(|(s, t, _)| s.as_deref() == Some(schema) && t == table).collect();
        return match candidates.as_slice() {
            [(_, _, id)] => Ok(*id),
            [] => Err(AdqlError::invalid_metadata(format!("foreign key target table \"{target_name}\" does not exist"))),
            _ => Err(AdqlError::invalid_metadata(format!("foreign key target table \"{target_name}\" is ambiguous"))),
        };
    }

    let candidates: Vec<_> = table_ids.iter().filter(|(_, t, _)| t == target_name).collect();
    match candidates.as_slice() {
        [(_, _, id)] => Ok(*id),
        [] => Err(AdqlError::invalid_metadata(format!("foreign key target table \"{target_name}\" does not exist"))),
        many => {
            let listed: Vec<String> = many
                .iter()
                .map(|(s, t, _)| match s {
                    Some(s) => format!("{s}.{t}"),
                    None => t.clone(),
                })
                .collect();
            Err(AdqlError::invalid_metadata(format!(
                "foreign key target table \"{target_name}\" is ambiguous (candidates: {})",
                listed.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_TABLESET: &str = r#"
        <vod:tableset xmlns:vod="http://www.ivoa.net/xml/VODataService/v1.1">
          <schema>
            <name>public</name>
            <title>Public schema</title>
            <table xsi:type="vs:Table">
              <name>public.stars</name>
              <description>Star catalog</description>
              <column std="true">
                <name>id</name>
                <dataType xsi:type="vs:TAPType">BIGINT</dataType>
                <flag>indexed</flag>
              </column>
              <column>
                <name>ra</name>
                <dataType xsi:type="vs:TAPType">DOUBLE</dataType>
              </column>
            </table>
            <table>
              <name>public.names</name>
              <column>
                <name>id</name>
                <dataType xsi:type="vs:TAPType">BIGINT</dataType>
              </column>
              <foreignKey>
                <targetTable>public.stars</targetTable>
                <fkColumn>
                  <fromColumn>id</fromColumn>
                  <targetColumn>id</targetColumn>
                </fkColumn>
              </foreignKey>
            </table>
          </schema>
        </vod:tableset>
    "#;

    #[test]
    fn ingests_schema_tables_columns_and_foreign_key() {
        let catalog = ingest_tableset(SIMPLE_TABLESET).unwrap();
        let schema_id = catalog.find_schema("public")[0];
        assert_eq!(catalog.schema(schema_id).unwrap().tables().count(), 2);

        let stars = catalog.find_table_in_schema(schema_id, "stars").unwrap();
        assert_eq!(catalog.table(stars).unwrap().column_count(), 2);

        let names = catalog.find_table_in_schema(schema_id, "names").unwrap();
        assert_eq!(catalog.table(names).unwrap().foreign_keys_as_source().count(), 1);
    }

    #[test]
    fn missing_name_fails() {
        let xml = r#"<vod:tableset><schema><title>no name</title></schema></vod:tableset>"#;
        assert!(ingest_tableset(xml).is_err());
    }

    #[test]
    fn unsupported_datatype_xsi_type_fails() {
        let xml = r#"
            <vod:tableset><schema><name>s</name>
              <table><name>t</name>
                <column><name>c</name><dataType xsi:type="xs:string">VARCHAR</dataType></column>
              </table>
            </schema></vod:tableset>
        "#;
        assert!(ingest_tableset(xml).is_err());
    }

    #[test]
    fn ambiguous_unqualified_foreign_key_target_fails() {
        let xml = r#"
            <vod:tableset>
              <schema><name>a</name>
                <table><name>t</name><column><name>id</name></column></table>
              </schema>
              <schema><name>b</name>
                <table><name>t</name><column><name>id</name></column></table>
                <table><name>u</name>
                  <column><name>id</name></column>
                  <foreignKey>
                    <targetTable>t</targetTable>
                    <fkColumn><fromColumn>id</fromColumn><targetColumn>id</targetColumn></fkColumn>
                  </foreignKey>
                </table>
              </schema>
            </vod:tableset>
        "#;
        let err = ingest_tableset(xml).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }
}
