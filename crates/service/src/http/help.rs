const HOME: &str = "Hello from DBFS";

const HELP: &str = "\
request examples:
/db              GET     view the root tree, a directory tree, or a file
/db              POST    write the request body as a file at the given path
/db              DELETE  delete the given file or directory
/share           GET     snapshot a directory into a new shared collection
/shared/<token>  GET     read shared data, no Authorization needed
/shared/<token>  DELETE  remove a shared collection
/register        POST    request a token by email
/help            GET     API
/examples        GET     examples
";

const EXAMPLES: &str = "\
request examples:
register          curl -w '\\n' -X POST -d '{\"email\": \"me@example.com\"}' localhost:8080/register
write file        curl -w '\\n' -X POST -H \"Authorization: <token>\" --data-binary @data.txt localhost:8080/db/data.txt
download file     curl -w '\\n' -X GET -H \"Authorization: <token>\" localhost:8080/db/data.txt
view root tree    curl -w '\\n' -X GET -H \"Authorization: <token>\" localhost:8080/db
delete file       curl -w '\\n' -X DELETE -H \"Authorization: <token>\" localhost:8080/db/data.txt
delete folder     curl -w '\\n' -X DELETE -H \"Authorization: <token>\" localhost:8080/db/someFolder
share folder      curl -w '\\n' -X GET -H \"Authorization: <token>\" localhost:8080/share/someFolder
download shared   curl -w '\\n' -X GET localhost:8080/shared/<share token>/someFile
";

pub async fn home_handler() -> &'static str {
    HOME
}

pub async fn help_handler() -> &'static str {
    HELP
}

pub async fn examples_handler() -> &'static str {
    EXAMPLES
}
