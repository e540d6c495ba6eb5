//! Starting files for a new package.

use serde_json::{Map, Value, json};

use super::protocol::WORKSPACE_PROTOCOL;
use crate::config::ScaffoldSettings;

/// Lowercase words joined by single hyphens, e.g. `alert-dialog`.
pub fn validate_package_name(name: &str) -> anyhow::Result<()> {
    let valid = !name.is_empty()
        && name
            .split('-')
            .all(|word| !word.is_empty() && word.bytes().all(|b| b.is_ascii_lowercase()));
    if !valid {
        anyhow::bail!(
            "Package name must be lowercase words joined by hyphens (e.g. button, alert-dialog), got '{}'",
            name
        );
    }
    Ok(())
}

/// `package.json` for a new package named `dir` under the configured scope.
pub fn package_manifest(dir: &str, settings: &ScaffoldSettings) -> Map<String, Value> {
    let name = format!("{}/{}", settings.scope, dir);
    let dependencies: Map<String, Value> = settings
        .dependencies
        .iter()
        .map(|dep| (format!("{}/{}", settings.scope, dep), json!(WORKSPACE_PROTOCOL)))
        .collect();

    let manifest = json!({
        "name": name,
        "version": settings.version,
        "description": format!("Primitive {}", dir),
        "license": settings.license,
        "main": "dist/index.js",
        "module": "dist/index.mjs",
        "types": "dist/index.d.ts",
        "exports": {
            ".": entry_points("index"),
            format!("./dist/{}", dir): entry_points(dir),
        },
        "files": ["dist"],
        "scripts": {
            "build": "tsup",
            "dev": "tsup --watch",
            "clean": "rm -rf dist",
            "pub:beta": "pnpm publish --no-git-checks --access public --tag beta",
            "pub:next": "pnpm publish --no-git-checks --access public --tag next",
            "pub:release": "pnpm publish --access public",
        },
        "dependencies": dependencies,
        "devDependencies": {
            "@tsconfig/react-native": "^1.0.1",
            "@types/react": "~19.0.14",
            "react": "19.0.0",
            "react-native": "0.79.2",
            "tsup": "^8.1.0",
        },
        "peerDependencies": {
            "react": "*",
            "react-native": "*",
            "react-native-web": "*",
        },
        "peerDependenciesMeta": {
            "react-native": { "optional": true },
            "react-native-web": { "optional": true },
        },
    });

    match manifest {
        Value::Object(fields) => fields,
        _ => Map::new(),
    }
}

fn entry_points(stem: &str) -> Value {
    json!({
        "import": format!("./dist/{}.mjs", stem),
        "require": format!("./dist/{}.js", stem),
        "types": format!("./dist/{}.d.ts", stem),
        "default": format!("./dist/{}.js", stem),
    })
}

/// `tsconfig.json` content, pretty-printed with a trailing newline.
pub fn tsconfig() -> String {
    let config = json!({
        "extends": "@tsconfig/react-native/tsconfig.json",
        "include": ["."],
        "compilerOptions": {
            "lib": [
                "dom",
                "es2019",
                "es2020.bigint",
                "es2020.date",
                "es2020.number",
                "es2020.promise",
                "es2020.string",
                "es2020.symbol.wellknown",
                "es2021.promise",
                "es2021.string",
                "es2021.weakref",
                "es2022.array",
                "es2022.object",
                "es2022.string",
            ],
        },
        "exclude": ["dist", "build", "node_modules"],
    });
    format!("{:#}\n", config)
}

pub fn changelog(name: &str, version: &str) -> String {
    format!(
        "# {}\n\n## {}\n\n### Patch Changes\n\n- Initial release\n",
        name, version
    )
}
