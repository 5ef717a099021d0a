use utoipa::{
    IntoParams, PartialSchema,
    openapi::{
        InfoBuilder, OpenApi, OpenApiBuilder, PathsBuilder, Required,
        content::ContentBuilder,
        path::{
            HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn, PathItem, PathItemBuilder,
        },
        request_body::{RequestBody, RequestBodyBuilder},
        response::ResponseBuilder,
    },
};

use crate::{core::record::RecordCore, models::ListParams};

fn path_parameter(name: &str, description: &str) -> ParameterBuilder {
    ParameterBuilder::new()
        .name(name)
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .description(Some(description))
        .schema(Some(i32::schema()))
}

fn json_body<S: PartialSchema>() -> RequestBody {
    RequestBodyBuilder::new()
        .content(
            "application/json",
            ContentBuilder::new().schema(Some(S::schema())).build(),
        )
        .required(Some(Required::True))
        .build()
}

fn operation(resource: &str, id: &str, summary: String) -> OperationBuilder {
    OperationBuilder::new()
        .tag(resource)
        .operation_id(Some(format!("{id}_{resource}")))
        .summary(Some(summary))
        .response(
            "200",
            ResponseBuilder::new()
                .description("`{\"status\": \"ok\", ...}` envelope")
                .build(),
        )
        .response(
            "400",
            ResponseBuilder::new()
                .description("Malformed path, query or body")
                .build(),
        )
}

fn with_not_found(operation: OperationBuilder, what: &str) -> OperationBuilder {
    operation.response(
        "404",
        ResponseBuilder::new()
            .description(format!("{what} not found"))
            .build(),
    )
}

/// Path items of every route [`RouterCore`](crate::core::router::RouterCore)
/// mounts for `R`, relative to the API prefix.
#[must_use]
pub fn resource_paths<R: RecordCore>(actions: &[String]) -> Vec<(String, PathItem)> {
    let name = R::ENDPOINT;
    let base = format!("/{name}");
    let list_params = || ListParams::into_params(|| Some(ParameterIn::Query));

    let collection = PathItemBuilder::new()
        .operation(
            HttpMethod::Get,
            operation(name, "list", format!("List {name} records"))
                .description(Some(R::RESOURCE_DESCRIPTION))
                .parameters(Some(list_params())),
        )
        .operation(
            HttpMethod::Post,
            operation(name, "create", format!("Create a {name} record"))
                .request_body(Some(json_body::<R::CreateModel>()))
                .response(
                    "201",
                    ResponseBuilder::new().description("Created").build(),
                )
                .response(
                    "409",
                    ResponseBuilder::new().description("Code already taken").build(),
                ),
        )
        .build();

    let item = PathItemBuilder::new()
        .operation(
            HttpMethod::Get,
            with_not_found(operation(name, "read", format!("Read one {name} record")), name)
                .parameter(path_parameter("id", "Record id")),
        )
        .operation(
            HttpMethod::Patch,
            with_not_found(operation(name, "update", format!("Update a {name} record")), name)
                .parameter(path_parameter("id", "Record id"))
                .request_body(Some(json_body::<R::UpdateModel>())),
        )
        .operation(
            HttpMethod::Delete,
            with_not_found(
                operation(name, "delete", format!("Remove a soft-deleted {name} record")),
                name,
            )
            .parameter(path_parameter("id", "Record id"))
            .response(
                "422",
                ResponseBuilder::new()
                    .description("Record is not marked as deleted")
                    .build(),
            ),
        )
        .build();

    let action = PathItemBuilder::new()
        .operation(
            HttpMethod::Patch,
            with_not_found(
                operation(
                    name,
                    "action",
                    format!("Run an action on a {name} record: {}", actions.join(", ")),
                ),
                "Record or action",
            )
            .parameter(path_parameter("id", "Record id"))
            .parameter(
                ParameterBuilder::new()
                    .name("action")
                    .parameter_in(ParameterIn::Path)
                    .required(Required::True)
                    .description(Some(actions.join(", ")))
                    .schema(Some(String::schema())),
            ),
        )
        .build();

    let owned = PathItemBuilder::new()
        .operation(
            HttpMethod::Get,
            operation(name, "list_from_owner", format!("List {name} records of an owner"))
                .parameter(path_parameter("owner_id", "Owner id"))
                .parameters(Some(list_params())),
        )
        .build();

    vec![
        (base.clone(), collection),
        (format!("{base}/{{id}}"), item),
        (format!("{base}/{{id}}/{{action}}"), action),
        (format!("{base}/from/{{owner_id}}"), owned),
    ]
}

/// OpenAPI document for the mounted resources, with paths under `/{prefix}`.
#[must_use]
pub fn document(prefix: &str, paths: Vec<(String, PathItem)>) -> OpenApi {
    let prefix = if prefix.is_empty() {
        String::new()
    } else {
        format!("/{prefix}")
    };
    let paths = paths
        .into_iter()
        .fold(PathsBuilder::new(), |builder, (path, item)| {
            builder.path(format!("{prefix}{path}"), item)
        });

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title(env!("CARGO_PKG_NAME"))
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some(env!("CARGO_PKG_DESCRIPTION"))),
        )
        .paths(paths)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::example::Example;

    #[test]
    fn test_resource_paths() {
        let actions = vec!["delete".to_string(), "undelete".to_string()];
        let paths = resource_paths::<Example>(&actions);
        let names: Vec<&str> = paths.iter().map(|(path, _)| path.as_str()).collect();
        assert_eq!(
            names,
            [
                "/example",
                "/example/{id}",
                "/example/{id}/{action}",
                "/example/from/{owner_id}"
            ]
        );
    }

    #[test]
    fn test_document_prefixes_paths() {
        let doc = document("v1", resource_paths::<Example>(&["delete".to_string()]));
        let value = serde_json::to_value(&doc).unwrap();
        let paths = value["paths"].as_object().unwrap();
        assert!(paths.contains_key("/v1/example"));
        assert!(paths.contains_key("/v1/example/{id}"));
        assert!(value["paths"]["/v1/example"]["get"].is_object());
        assert!(value["paths"]["/v1/example"]["post"]["requestBody"].is_object());
        assert_eq!(value["info"]["title"], "crudcore");
    }

    #[test]
    fn test_document_without_prefix() {
        let doc = document("", resource_paths::<Example>(&[]));
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value["paths"]["/example/from/{owner_id}"]["get"].is_object());
    }
}
