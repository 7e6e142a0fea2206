//! One-line PHP programs that read the Magento config on the remote host
//! and print the database settings as `[key]=value` tokens.

use crate::types::{CmsVariant, RemoteRoot};
use crate::wrapper::{php_string, quote, RemoteCommand};

/// Output key and the config key it is read from.
const MAGENTO1_KEYS: [(&str, &str); 4] = [
    ("host", "HOST"),
    ("name", "DBNAME"),
    ("user", "USERNAME"),
    ("password", "PASSWORD"),
];

const MAGENTO2_KEYS: [(&str, &str); 4] = [
    ("host", "host"),
    ("name", "dbname"),
    ("user", "username"),
    ("password", "password"),
];

/// Command printing the database settings of `root`, or `None` for an
/// unknown variant.
pub fn config_reader_command(root: &RemoteRoot, variant: CmsVariant) -> Option<RemoteCommand> {
    let code = match variant {
        CmsVariant::Magento1 => magento1_code(&root.join("app/etc/local.xml")),
        CmsVariant::Magento2 => magento2_code(&root.join("app/etc/env.php")),
        CmsVariant::Unknown => return None,
    };
    Some(RemoteCommand::new(format!("php -r {}", quote(&code))))
}

fn key_map(keys: &[(&str, &str)]) -> String {
    let pairs = keys
        .iter()
        .map(|(out, key)| format!("{}=>{}", php_string(out), php_string(key)))
        .collect::<Vec<_>>()
        .join(",");
    format!("array({})", pairs)
}

/// Walks the XML parser's event stream and takes the first value of each
/// element.
fn magento1_code(config_path: &str) -> String {
    let path = php_string(config_path);
    format!(
        concat!(
            "$a=@file_get_contents({path});",
            "if($a===false){{fwrite(STDERR,\"cannot read \".{path});exit(1);}}",
            "$p=xml_parser_create();",
            "xml_parse_into_struct($p,$a,$vals,$index);",
            "foreach({keys} as $o=>$k){{",
            "if(isset($index[$k])&&isset($vals[$index[$k][0]][\"value\"])){{",
            "echo \"[\".$o.\"]=\".$vals[$index[$k][0]][\"value\"].\" \";",
            "}}}}"
        ),
        path = path,
        keys = key_map(&MAGENTO1_KEYS)
    )
}

/// Loads the config array and reads `db.connection.default`.
fn magento2_code(config_path: &str) -> String {
    let path = php_string(config_path);
    format!(
        concat!(
            "$a=@include {path};",
            "if(!is_array($a)){{fwrite(STDERR,\"cannot load \".{path});exit(1);}}",
            "$c=isset($a[\"db\"][\"connection\"][\"default\"])?$a[\"db\"][\"connection\"][\"default\"]:array();",
            "foreach({keys} as $o=>$k){{",
            "if(isset($c[$k])){{",
            "echo \"[\".$o.\"]=\".$c[$k].\" \";",
            "}}}}"
        ),
        path = path,
        keys = key_map(&MAGENTO2_KEYS)
    )
}
